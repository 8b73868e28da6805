//! Pure reducer over [`AccountCollection`].
//!
//! Every function returns `Some(next)` when the collection changed and `None`
//! when the input was a no-op, so callers can skip publishing. Inputs are
//! never mutated; `next` is a fresh copy.

use stk_derive::{attribute_seed, Address};
use stk_ledger::{AccountSnapshot, ChangeEvent, InflationReward};

use crate::tracked::{AccountCollection, TrackedAccount};

/// Inputs the reducer needs to label newly observed addresses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReduceContext {
    pub owner: Address,
    pub program: Address,
    /// Seed indices `0..seed_scan_range` tried when attributing a new address.
    pub seed_scan_range: u32,
}

/// Apply one ledger change event.
///
/// - removal of a tracked address drops it; removal of an unknown one is a no-op
/// - update of a tracked address replaces balance and state, keeping its seed
/// - update of an unknown address appends it with an attributed seed
pub fn reduce(
    current: &AccountCollection,
    event: &ChangeEvent,
    ctx: &ReduceContext,
) -> Option<AccountCollection> {
    match event {
        ChangeEvent::Removed { address } => {
            let idx = current.position(address)?;
            let mut next = current.clone();
            next.remove_at(idx);
            Some(next)
        }
        ChangeEvent::Upserted(snapshot) => match current.position(&snapshot.address) {
            Some(idx) => {
                let existing = &current.as_slice()[idx];
                if existing.lamports == snapshot.lamports && existing.state == snapshot.state {
                    return None;
                }
                let mut next = current.clone();
                let entry = next.entry_mut(idx);
                entry.lamports = snapshot.lamports;
                entry.state = snapshot.state.clone();
                next.resort();
                Some(next)
            }
            None => {
                let seed = attribute_seed(
                    &ctx.owner,
                    &ctx.program,
                    &snapshot.address,
                    ctx.seed_scan_range,
                );
                let mut next = current.clone();
                next.push(TrackedAccount::from_snapshot(snapshot.clone(), seed));
                next.resort();
                Some(next)
            }
        },
    }
}

/// Add an account confirmed by a direct fetch.
///
/// If a subscription already delivered it, the entry is refreshed in place and
/// an unknown seed is upgraded to the caller's label.
pub fn reduce_insert(current: &AccountCollection, account: &TrackedAccount) -> Option<AccountCollection> {
    match current.position(&account.address) {
        Some(idx) => {
            let existing = &current.as_slice()[idx];
            let upgrade_seed = !existing.seed.is_known() && account.seed.is_known();
            if !upgrade_seed
                && existing.lamports == account.lamports
                && existing.state == account.state
            {
                return None;
            }
            let mut next = current.clone();
            let entry = next.entry_mut(idx);
            entry.lamports = account.lamports;
            entry.state = account.state.clone();
            if upgrade_seed {
                entry.seed = account.seed.clone();
            }
            next.resort();
            Some(next)
        }
        None => {
            let mut next = current.clone();
            next.push(account.clone());
            next.resort();
            Some(next)
        }
    }
}

/// Append reward history to a tracked account. Epochs already recorded are
/// skipped; an untracked address is a no-op.
pub fn reduce_rewards(
    current: &AccountCollection,
    address: &Address,
    rewards: &[InflationReward],
) -> Option<AccountCollection> {
    let idx = current.position(address)?;
    let existing = &current.as_slice()[idx].inflation_rewards;
    let fresh: Vec<InflationReward> = rewards
        .iter()
        .filter(|r| !existing.iter().any(|e| e.epoch == r.epoch))
        .cloned()
        .collect();
    if fresh.is_empty() {
        return None;
    }
    let mut next = current.clone();
    next.entry_mut(idx).inflation_rewards.extend(fresh);
    Some(next)
}

/// Label a scanned account for the initial collection.
pub(crate) fn track_scanned(snapshot: AccountSnapshot, ctx: &ReduceContext) -> TrackedAccount {
    let seed = attribute_seed(&ctx.owner, &ctx.program, &snapshot.address, ctx.seed_scan_range);
    TrackedAccount::from_snapshot(snapshot, seed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SortPolicy;
    use stk_derive::{derive_with_seed, SeedLabel};
    use stk_ledger::{Authorized, Lockup, Meta, StakeState};

    fn owner() -> Address {
        Address::new([7; 32])
    }

    fn program() -> Address {
        Address::new([6; 32])
    }

    fn ctx() -> ReduceContext {
        ReduceContext {
            owner: owner(),
            program: program(),
            seed_scan_range: 20,
        }
    }

    fn snap(address: Address, lamports: u64) -> AccountSnapshot {
        AccountSnapshot {
            address,
            lamports,
            state: StakeState::Initialized(Meta {
                rent_exempt_reserve: 1,
                authorized: Authorized {
                    staker: owner(),
                    withdrawer: owner(),
                },
                lockup: Lockup::default(),
            }),
        }
    }

    fn derived(seed: &str) -> Address {
        derive_with_seed(&owner(), seed, &program()).unwrap()
    }

    fn upsert(address: Address, lamports: u64) -> ChangeEvent {
        ChangeEvent::Upserted(snap(address, lamports))
    }

    fn empty() -> AccountCollection {
        AccountCollection::new(SortPolicy::BySeed)
    }

    // -----------------------------------------------------------------------
    // Upserts
    // -----------------------------------------------------------------------

    #[test]
    fn new_address_is_appended_with_attributed_seed() {
        let next = reduce(&empty(), &upsert(derived("3"), 10), &ctx()).unwrap();
        assert_eq!(next.len(), 1);
        assert_eq!(next.as_slice()[0].seed, SeedLabel::known("3"));
    }

    #[test]
    fn unattributable_address_is_labelled_unknown() {
        let next = reduce(&empty(), &upsert(Address::new([1; 32]), 10), &ctx()).unwrap();
        assert_eq!(next.as_slice()[0].seed, SeedLabel::Unknown);
        assert_eq!(next.as_slice()[0].seed.to_string(), "N.A.");
    }

    #[test]
    fn replaying_an_upsert_is_a_no_op() {
        let event = upsert(derived("0"), 10);
        let once = reduce(&empty(), &event, &ctx()).unwrap();
        assert_eq!(reduce(&once, &event, &ctx()), None);
    }

    #[test]
    fn update_replaces_state_and_keeps_seed() {
        let addr = derived("0");
        let start = reduce(&empty(), &upsert(addr, 10), &ctx()).unwrap();

        let next = reduce(&start, &upsert(addr, 99), &ctx()).unwrap();
        let entry = next.get(&addr).unwrap();
        assert_eq!(entry.lamports, 99);
        assert_eq!(entry.seed, SeedLabel::known("0"));
        // input untouched
        assert_eq!(start.get(&addr).unwrap().lamports, 10);
    }

    // -----------------------------------------------------------------------
    // Removals
    // -----------------------------------------------------------------------

    #[test]
    fn removal_of_untracked_address_is_a_no_op() {
        let event = ChangeEvent::Removed {
            address: derived("9"),
        };
        assert_eq!(reduce(&empty(), &event, &ctx()), None);
    }

    #[test]
    fn removal_drops_the_entry_and_replay_is_a_no_op() {
        let addr = derived("1");
        let start = reduce(&empty(), &upsert(addr, 10), &ctx()).unwrap();
        let event = ChangeEvent::Removed { address: addr };
        let next = reduce(&start, &event, &ctx()).unwrap();
        assert!(next.is_empty());
        assert_eq!(reduce(&next, &event, &ctx()), None);
    }

    fn permutations(n: usize) -> Vec<Vec<usize>> {
        if n == 0 {
            return vec![Vec::new()];
        }
        let mut out = Vec::new();
        for shorter in permutations(n - 1) {
            for pos in 0..=shorter.len() {
                let mut p = shorter.clone();
                p.insert(pos, n - 1);
                out.push(p);
            }
        }
        out
    }

    #[test]
    fn disjoint_events_commute_in_every_order() {
        let (d0, d1, d2) = (derived("0"), derived("1"), derived("2"));
        let foreign = Address::new([1; 32]);
        let start = [upsert(d0, 10), upsert(d1, 20)]
            .iter()
            .fold(empty(), |c, e| reduce(&c, e, &ctx()).unwrap());

        let events = [
            upsert(d0, 15),
            ChangeEvent::Removed { address: d1 },
            upsert(d2, 30),
            upsert(foreign, 40),
        ];

        let orders = permutations(events.len());
        assert_eq!(orders.len(), 24);

        let results: Vec<AccountCollection> = orders
            .iter()
            .map(|order| {
                order
                    .iter()
                    .fold(start.clone(), |c, &i| reduce(&c, &events[i], &ctx()).unwrap_or(c))
            })
            .collect();

        for r in &results[1..] {
            assert_eq!(r, &results[0]);
        }
        let end = &results[0];
        let order: Vec<Address> = end.iter().map(|t| t.address).collect();
        assert_eq!(order, vec![d0, d2, foreign]);
        assert_eq!(end.get(&d0).unwrap().lamports, 15);
        assert_eq!(end.get(&foreign).unwrap().seed, SeedLabel::Unknown);
    }

    // -----------------------------------------------------------------------
    // Inserts and rewards
    // -----------------------------------------------------------------------

    #[test]
    fn insert_after_subscription_upgrades_unknown_seed() {
        // Seed 42 is outside the attribution range.
        let addr = derived("42");
        let start = reduce(&empty(), &upsert(addr, 10), &ctx()).unwrap();
        assert_eq!(start.get(&addr).unwrap().seed, SeedLabel::Unknown);

        let confirmed = TrackedAccount::from_snapshot(snap(addr, 10), SeedLabel::known("42"));
        let next = reduce_insert(&start, &confirmed).unwrap();
        assert_eq!(next.len(), 1);
        assert_eq!(next.get(&addr).unwrap().seed, SeedLabel::known("42"));
        assert_eq!(reduce_insert(&next, &confirmed), None);
    }

    #[test]
    fn rewards_append_and_skip_known_epochs() {
        let addr = derived("0");
        let start = reduce(&empty(), &upsert(addr, 10), &ctx()).unwrap();
        let reward = |epoch| InflationReward {
            epoch,
            amount: 5,
            post_balance: 15,
            effective_slot: epoch * 432_000,
        };

        let next = reduce_rewards(&start, &addr, &[reward(300), reward(301)]).unwrap();
        assert_eq!(next.get(&addr).unwrap().inflation_rewards.len(), 2);
        assert_eq!(reduce_rewards(&next, &addr, &[reward(301)]), None);

        let later = reduce(&next, &upsert(addr, 20), &ctx()).unwrap();
        assert_eq!(later.get(&addr).unwrap().inflation_rewards.len(), 2);
    }
}
