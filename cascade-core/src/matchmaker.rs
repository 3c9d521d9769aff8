//! Squad placement and host election.
//!
//! Placement is greedy: the first squad with a free slot that stays viable
//! with the candidate added wins. Already placed members are never moved.

use crate::entities::{Participant, Region, Squad};

/// Result of [`place_candidate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// Index of the squad the candidate landed in.
    pub squad_index: usize,
    /// The squad reached capacity with this placement.
    pub filled: bool,
    /// No existing squad accepted the candidate.
    pub opened_new_squad: bool,
}

/// Whether some member could host everyone in `regions` below the
/// unplayable threshold. Empty input is never viable.
pub fn is_viable(regions: &[Region]) -> bool {
    regions
        .iter()
        .any(|host| regions.iter().all(|member| host.can_host(*member)))
}

pub fn is_squad_viable(squad: &Squad) -> bool {
    let regions: Vec<Region> = squad.regions().collect();
    is_viable(&regions)
}

/// Put `candidate` in the first open squad that stays viable, or open a new
/// squad at the end of the list.
pub fn place_candidate(squads: &mut Vec<Squad>, candidate: Participant) -> Placement {
    let target = squads.iter().position(|squad| {
        if squad.is_full() {
            return false;
        }
        let mut regions: Vec<Region> = squad.regions().collect();
        regions.push(candidate.region);
        is_viable(&regions)
    });

    match target.and_then(|index| squads.get_mut(index).map(|squad| (index, squad))) {
        Some((squad_index, squad)) => {
            squad.push(candidate);
            Placement {
                squad_index,
                filled: squad.is_full(),
                opened_new_squad: false,
            }
        }
        None => {
            squads.push(Squad::new(candidate));
            Placement {
                squad_index: squads.len() - 1,
                filled: false,
                opened_new_squad: true,
            }
        }
    }
}

/// Total cost of `host` serving every member of `squad`, itself included.
pub fn hosting_cost(host: Region, squad: &Squad) -> u32 {
    squad.regions().map(|m| u32::from(host.cost_to(m))).sum()
}

/// The member with the lowest total hosting cost. Ties go to the earliest
/// joined member.
pub fn select_host(squad: &Squad) -> Option<&Participant> {
    let mut best: Option<(&Participant, u32)> = None;
    for candidate in squad.members() {
        let cost = hosting_cost(candidate.region, squad);
        match best {
            Some((_, min)) if cost >= min => {}
            _ => best = Some((candidate, cost)),
        }
    }
    best.map(|(host, _)| host)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cascade_sdk::objects::{ChannelId, UserId};

    fn member(id: &str, region: Region) -> Participant {
        Participant {
            id: UserId::from(id),
            name: id.into(),
            region,
            channel_id: ChannelId::from("c1"),
        }
    }

    #[test]
    fn test_empty_is_not_viable() {
        assert!(!is_viable(&[]));
        assert!(!is_squad_viable(&Squad::default()));
    }

    #[test]
    fn test_viability_needs_one_host_reaching_everyone() {
        // ASIA-SA is unplayable, but NA reaches both.
        assert!(is_viable(&[Region::Asia, Region::Sa, Region::Na]));
        assert!(!is_viable(&[Region::Asia, Region::Sa]));
        // OCE-AF is unplayable and nobody else is around.
        assert!(!is_viable(&[Region::Oce, Region::Af]));
        assert!(is_viable(&[Region::Oce]));
    }

    #[test]
    fn test_viability_matches_definition_for_all_pairs() {
        for a in Region::ALL {
            for b in Region::ALL {
                let expected = a.can_host(b) && a.can_host(a) || b.can_host(a) && b.can_host(b);
                assert_eq!(is_viable(&[a, b]), expected, "{a} + {b}");
            }
        }
    }

    #[test]
    fn test_place_fills_first_open_squad() {
        let mut squads = Vec::new();
        for (i, region) in [Region::Na, Region::Eu, Region::Na, Region::Na]
            .into_iter()
            .enumerate()
        {
            let placement = place_candidate(&mut squads, member(&i.to_string(), region));
            assert_eq!(placement.squad_index, 0);
            assert_eq!(placement.filled, i == 3);
            assert_eq!(placement.opened_new_squad, i == 0);
        }
        assert_eq!(squads.len(), 1);
        assert!(squads[0].is_full());

        let placement = place_candidate(&mut squads, member("late", Region::Na));
        assert_eq!(placement.squad_index, 1);
        assert!(placement.opened_new_squad);
        assert_eq!(squads.len(), 2);
    }

    #[test]
    fn test_unplayable_candidate_opens_new_squad() {
        let mut squads = vec![Squad::new(member("asia", Region::Asia))];
        let placement = place_candidate(&mut squads, member("sa", Region::Sa));
        assert!(placement.opened_new_squad);
        assert_eq!(squads.len(), 2);
        assert_eq!(squads[0].len(), 1);
        assert_eq!(squads[1].members()[0].id, UserId::from("sa"));
    }

    #[test]
    fn test_placement_skips_to_later_viable_squad() {
        let mut squads = vec![
            Squad::new(member("oce", Region::Oce)),
            Squad::new(member("eu", Region::Eu)),
        ];
        let placement = place_candidate(&mut squads, member("af", Region::Af));
        assert_eq!(placement.squad_index, 1);
        assert!(!placement.opened_new_squad);
        assert_eq!(squads[0].len(), 1);
        assert_eq!(
            squads[1].members().iter().map(|m| m.id.as_str()).collect::<Vec<_>>(),
            vec!["eu", "af"]
        );
    }

    #[test]
    fn test_select_host_minimises_total_cost() {
        let squad: Squad = [
            member("eu1", Region::Eu),
            member("na1", Region::Na),
            member("na2", Region::Na),
            member("na3", Region::Na),
        ]
        .into_iter()
        .collect();
        let host = select_host(&squad).unwrap();
        assert_eq!(host.id, UserId::from("na1"));
        assert_eq!(hosting_cost(Region::Na, &squad), 1);
        assert_eq!(hosting_cost(Region::Eu, &squad), 3);
    }

    #[test]
    fn test_select_host_ties_go_to_earliest() {
        let squad: Squad = [
            member("eu1", Region::Eu),
            member("na1", Region::Na),
            member("eu2", Region::Eu),
            member("na2", Region::Na),
        ]
        .into_iter()
        .collect();
        assert_eq!(select_host(&squad).unwrap().id, UserId::from("eu1"));
        assert_eq!(select_host(&squad).unwrap().id, UserId::from("eu1"));
    }

    #[test]
    fn test_select_host_empty() {
        assert!(select_host(&Squad::default()).is_none());
    }
}
