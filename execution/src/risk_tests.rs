//! Watchdog and excess accounting scenarios.

use crate::mocks::{approve_game, contract, deployment, install_admins, wallet, Memory, StaticOwners};
use crate::state_transition::execute_block;
use crate::{query, Layer, State};
use commonware_runtime::{deterministic::Runner, Runner as _};
use gamehub_types::{
    execution::{Call, Event, Instruction, Key, Output},
    registry::{GameStatus, MICROS_PER_DAY, MIN_AMOUNT, MULTIPLIER, PROPOSAL_FEE},
    watchdog::PayoutDecision,
    Address, RegistryError,
};
use rand::{rngs::StdRng, Rng, SeedableRng};

const NOW: u64 = 20 * MICROS_PER_DAY + 600;
const LEDGER: u8 = 9;
const ADMIN: u8 = 1;

/// A layer with admins, a ledger caller and one approved game owned by `wallet(10)`.
async fn guarded_game<'a>(
    state: &'a Memory,
    owners: &'a StaticOwners,
    max_payout: u128,
    max_loss: u128,
) -> Layer<'a, Memory, StaticOwners> {
    let deployment = deployment();
    let mut layer = Layer::new(state, owners, deployment, NOW);
    install_admins(&mut layer, &wallet(ADMIN), &[]).await;
    layer
        .set_ledger_caller(&deployment.owner, &contract(LEDGER))
        .await
        .unwrap();
    approve_game(&mut layer, &wallet(ADMIN), &wallet(10), &contract(1), None).await;
    layer
        .set_max_payout(&wallet(ADMIN), &contract(1), max_payout)
        .await
        .unwrap();
    layer.set_max_loss(&wallet(ADMIN), max_loss).await.unwrap();
    layer.toggle_watchdog(&wallet(ADMIN)).await.unwrap();
    layer
}

async fn today(layer: &Layer<'_, Memory, StaticOwners>, game: &Address) -> (String, String) {
    let wagers = query::daily_wagers(layer, NOW, 0).await.unwrap();
    let payouts = query::daily_payouts(layer, NOW, 0).await.unwrap();
    (wagers[game].clone(), payouts[game].clone())
}

#[test]
fn overpayment_suspends_without_touching_the_ledger() {
    let executor = Runner::default();
    executor.start(|_| async move {
        let state = Memory::default();
        let owners = StaticOwners::default().with_owner(contract(1), wallet(10));
        let mut layer = guarded_game(&state, &owners, MULTIPLIER, 100 * MULTIPLIER).await;

        let before = today(&layer, &contract(1)).await;
        let requested = MULTIPLIER * 3 / 2;
        let (decision, events) = layer
            .record_payout(&contract(LEDGER), &contract(1), requested)
            .await
            .unwrap();
        assert_eq!(
            decision,
            PayoutDecision::RejectOverpayment {
                requested,
                max_payout: MULTIPLIER,
            }
        );
        assert!(matches!(
            &events[..],
            [
                Event::PayoutRefused { game, decision: refused, .. },
                Event::GameSuspended { score, note },
            ] if *game == contract(1)
                && *refused == decision
                && *score == contract(1)
                && note.contains("overpayment")
        ));
        assert_eq!(
            query::game_status(&layer, &contract(1)).await.unwrap(),
            GameStatus::GameSuspended
        );

        // Suspended games drop out of the daily reports; read the bucket directly.
        assert_eq!(before, ("0".to_string(), "0".to_string()));
        assert!(layer
            .get(&Key::Ledger {
                day: NOW / MICROS_PER_DAY,
                game: contract(1),
            })
            .await
            .unwrap()
            .is_none());
    });
}

#[test]
fn loss_ceiling_counts_the_requested_payout() {
    let executor = Runner::default();
    executor.start(|_| async move {
        let state = Memory::default();
        let owners = StaticOwners::default().with_owner(contract(1), wallet(10));
        let mut layer = guarded_game(&state, &owners, MULTIPLIER, MIN_AMOUNT).await;

        let (decision, _) = layer
            .record_payout(&contract(LEDGER), &contract(1), MIN_AMOUNT)
            .await
            .unwrap();
        assert_eq!(
            decision,
            PayoutDecision::RejectExcessLoss {
                max_loss: MIN_AMOUNT,
                loss: MIN_AMOUNT as i128,
            }
        );
        assert_eq!(
            query::game_status(&layer, &contract(1)).await.unwrap(),
            GameStatus::GameSuspended
        );
    });
}

#[test]
fn wagers_make_room_for_payouts() {
    let executor = Runner::default();
    executor.start(|_| async move {
        let state = Memory::default();
        let owners = StaticOwners::default().with_owner(contract(1), wallet(10));
        let mut layer = guarded_game(&state, &owners, MULTIPLIER, MIN_AMOUNT).await;

        layer
            .record_wager(&contract(LEDGER), &contract(1), MULTIPLIER)
            .await
            .unwrap();
        let (decision, events) = layer
            .record_payout(&contract(LEDGER), &contract(1), MULTIPLIER)
            .await
            .unwrap();
        assert!(decision.is_accepted());
        assert!(events.is_empty());
        assert_eq!(
            today(&layer, &contract(1)).await,
            (MULTIPLIER.to_string(), MULTIPLIER.to_string())
        );
    });
}

#[test]
fn proposals_under_watchdog_carry_a_payout_ceiling() {
    let executor = Runner::default();
    executor.start(|_| async move {
        let state = Memory::default();
        let owners = StaticOwners::default()
            .with_owner(contract(1), wallet(10))
            .with_owner(contract(2), wallet(20));
        let mut layer = guarded_game(&state, &owners, MULTIPLIER, MIN_AMOUNT).await;

        let bare = crate::mocks::sample_metadata(&contract(2), &wallet(20), None);
        let err = layer
            .submit_proposal(&wallet(20), &bare, PROPOSAL_FEE)
            .await
            .unwrap_err();
        assert!(matches!(
            err.rejection(),
            Some(RegistryError::InvalidMetadata { field: "maxPayout", .. })
        ));

        let ceiling = 250 * MULTIPLIER;
        let with_ceiling =
            crate::mocks::sample_metadata(&contract(2), &wallet(20), Some(ceiling));
        layer
            .submit_proposal(&wallet(20), &with_ceiling, PROPOSAL_FEE)
            .await
            .unwrap();
        assert_eq!(
            query::max_payout(&layer, &contract(2)).await.unwrap(),
            ceiling
        );
    });
}

#[test]
fn no_excess_outside_the_dividend_regime() {
    let executor = Runner::default();
    executor.start(|_| async move {
        let mut state = Memory::default();
        let owners = StaticOwners::default().with_owner(contract(1), wallet(10));
        let deployment = deployment();

        let mut layer = Layer::new(&state, &owners, deployment, NOW);
        install_admins(&mut layer, &wallet(ADMIN), &[]).await;
        layer
            .set_ledger_caller(&deployment.owner, &contract(LEDGER))
            .await
            .unwrap();
        approve_game(&mut layer, &wallet(ADMIN), &wallet(10), &contract(1), None).await;
        let changes = layer.commit();
        state.apply(changes).await.unwrap();

        let result = execute_block(
            &mut state,
            &owners,
            deployment,
            1,
            NOW,
            vec![
                Call::new(
                    contract(LEDGER),
                    Instruction::RecordWager {
                        game: contract(1),
                        amount: 500,
                    },
                ),
                Call::new(
                    contract(LEDGER),
                    Instruction::RecordPayout {
                        game: contract(1),
                        amount: 200,
                    },
                ),
                Call::new(contract(LEDGER), Instruction::RecordExcess),
            ],
        )
        .await
        .unwrap();
        assert_eq!(result.executed_calls, 3);
        assert!(result.outputs.contains(&Output::Event(Event::ExcessRecorded {
            day: NOW / MICROS_PER_DAY - 1,
            positive_excess: 0,
            developers_amount: 0,
        })));

        assert_eq!(query::todays_games_excess(&state).await.unwrap()[&contract(1)], "0");
        assert_eq!(query::excess(&state).await.unwrap(), 0);
        assert_eq!(
            query::yesterdays_games_excess(&state, NOW).await.unwrap()[&contract(1)],
            "0"
        );
    });
}

#[test]
fn rollover_splits_positive_excess() {
    let executor = Runner::default();
    executor.start(|_| async move {
        let state = Memory::default();
        let owners = StaticOwners::default()
            .with_owner(contract(1), wallet(10))
            .with_owner(contract(2), wallet(20));
        let deployment = deployment();
        let mut layer = Layer::new(&state, &owners, deployment, NOW);
        install_admins(&mut layer, &wallet(ADMIN), &[]).await;
        layer
            .set_ledger_caller(&deployment.owner, &contract(LEDGER))
            .await
            .unwrap();
        layer.set_developers_share(&deployment.owner, 10).await.unwrap();
        approve_game(&mut layer, &wallet(ADMIN), &wallet(10), &contract(1), None).await;
        approve_game(&mut layer, &wallet(ADMIN), &wallet(20), &contract(2), None).await;
        layer
            .set_dividend_change_time(&deployment.owner, NOW - 1)
            .await
            .unwrap();

        layer
            .record_wager(&contract(LEDGER), &contract(1), 100)
            .await
            .unwrap();
        layer
            .record_wager(&contract(LEDGER), &contract(2), 20)
            .await
            .unwrap();
        layer
            .record_payout(&contract(LEDGER), &contract(2), 50)
            .await
            .unwrap();

        let (amount, _) = layer.record_excess(&contract(LEDGER)).await.unwrap();
        assert_eq!(amount, 10);

        let archived = query::games_excess(&layer, NOW, -1).await.unwrap();
        assert_eq!(archived[&contract(1)], "100");
        assert_eq!(archived[&contract(2)], "-30");
        assert_eq!(
            query::games_excess(&layer, NOW, (NOW / MICROS_PER_DAY - 1) as i64)
                .await
                .unwrap(),
            archived
        );
        let running = query::games_excess(&layer, NOW, 0).await.unwrap();
        assert_eq!(running[&contract(1)], "0");
        assert_eq!(running[&contract(2)], "-30");

        // Moving the regime marker clears running balances.
        layer
            .set_dividend_change_time(&deployment.owner, NOW)
            .await
            .unwrap();
        assert_eq!(query::todays_games_excess(&layer).await.unwrap()[&contract(2)], "0");
    });
}

#[test]
fn random_traffic_never_shrinks_the_ledger() {
    let executor = Runner::default();
    executor.start(|_| async move {
        let state = Memory::default();
        let owners = StaticOwners::default().with_owner(contract(1), wallet(10));
        let mut layer = guarded_game(&state, &owners, 2 * MULTIPLIER, 5 * MULTIPLIER).await;
        let mut rng = StdRng::seed_from_u64(7);
        let day = NOW / MICROS_PER_DAY;

        for _ in 0..200 {
            let before = crate::state::load_ledger(&layer, day, &contract(1))
                .await
                .unwrap();
            let amount = rng.gen_range(0..3 * MULTIPLIER);
            if rng.gen_bool(0.5) {
                layer
                    .record_wager(&contract(LEDGER), &contract(1), amount)
                    .await
                    .unwrap();
            } else {
                let (decision, _) = layer
                    .record_payout(&contract(LEDGER), &contract(1), amount)
                    .await
                    .unwrap();
                let after = crate::state::load_ledger(&layer, day, &contract(1))
                    .await
                    .unwrap();
                if !decision.is_accepted() {
                    assert_eq!(after, before);
                    continue;
                }
            }
            let after = crate::state::load_ledger(&layer, day, &contract(1))
                .await
                .unwrap();
            assert!(after.wagers >= before.wagers);
            assert!(after.payouts >= before.payouts);
            assert!(
                (after.payouts as i128 - after.wagers as i128) < (5 * MULTIPLIER) as i128,
                "accepted payouts stay under the loss ceiling"
            );
        }
    });
}

#[test]
fn refusal_leaves_unreviewed_games_under_review() {
    let executor = Runner::default();
    executor.start(|_| async move {
        let state = Memory::default();
        let owners = StaticOwners::default()
            .with_owner(contract(1), wallet(10))
            .with_owner(contract(2), wallet(20));
        let mut layer = guarded_game(&state, &owners, MULTIPLIER, 100 * MULTIPLIER).await;

        let metadata = crate::mocks::sample_metadata(&contract(2), &wallet(20), Some(MULTIPLIER));
        layer
            .submit_proposal(&wallet(20), &metadata, PROPOSAL_FEE)
            .await
            .unwrap();

        let (decision, events) = layer
            .record_payout(&contract(LEDGER), &contract(2), 2 * MULTIPLIER)
            .await
            .unwrap();
        assert!(!decision.is_accepted());
        assert!(matches!(
            &events[..],
            [Event::PayoutRefused { game, .. }] if *game == contract(2)
        ));
        assert_eq!(
            query::game_status(&layer, &contract(2)).await.unwrap(),
            GameStatus::Waiting
        );

        // Without a suspension there is no shortcut to approval.
        let err = layer
            .set_game_status(&wallet(ADMIN), GameStatus::GameApproved, &contract(2))
            .await
            .unwrap_err();
        assert!(matches!(
            err.rejection(),
            Some(RegistryError::IllegalTransition { .. })
        ));
        assert_eq!(
            query::game_status(&layer, &contract(2)).await.unwrap(),
            GameStatus::Waiting
        );
    });
}

#[test]
fn refused_payouts_are_visible_in_block_outputs() {
    let executor = Runner::default();
    executor.start(|_| async move {
        let mut state = Memory::default();
        let owners = StaticOwners::default().with_owner(contract(1), wallet(10));
        let layer = guarded_game(&state, &owners, MULTIPLIER, 100 * MULTIPLIER).await;
        let changes = layer.commit();
        state.apply(changes).await.unwrap();

        let payout = |amount| {
            Call::new(
                contract(LEDGER),
                Instruction::RecordPayout {
                    game: contract(1),
                    amount,
                },
            )
        };
        let result = execute_block(
            &mut state,
            &owners,
            deployment(),
            1,
            NOW,
            vec![payout(MIN_AMOUNT), payout(2 * MULTIPLIER)],
        )
        .await
        .unwrap();

        let refusals: Vec<_> = result
            .outputs
            .iter()
            .filter_map(|output| match output {
                Output::Event(Event::PayoutRefused { decision, .. }) => Some(*decision),
                _ => None,
            })
            .collect();
        assert_eq!(
            refusals,
            vec![PayoutDecision::RejectOverpayment {
                requested: 2 * MULTIPLIER,
                max_payout: MULTIPLIER,
            }]
        );
        assert_eq!(result.executed_calls, 2);
        assert_eq!(
            query::daily_payouts(&state, NOW, 0).await.unwrap().get(&contract(1)),
            None
        );
        assert_eq!(
            crate::state::load_ledger(&state, NOW / MICROS_PER_DAY, &contract(1))
                .await
                .unwrap()
                .payouts,
            MIN_AMOUNT
        );
    });
}
