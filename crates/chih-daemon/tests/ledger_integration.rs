// crates/chih-daemon/tests/ledger_integration.rs
//
// Integration tests for the daemon's ledger wiring.
//
// Exercises the shared `Arc<RwLock<StakingPool>>` under concurrent tasks, the
// event broadcast channel, and full signed-call flows through the RPC
// dispatcher. Uses the public APIs of chih-ledger and chih-rpc directly since
// the daemon is a binary crate with no lib.rs.

use std::sync::Arc;

use serde_json::json;

use chih_core::crypto::Keypair;
use chih_core::AccountId;
use chih_ledger::{
    EmissionMode, ManualClock, PoolConfig, PoolEvent, StakingPool, TokenVault, SCALE,
};
use chih_rpc::{ChihRpcServer, JsonRpcRequest, LedgerSharedState, RpcConfig, SignedCall};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const RATE: u128 = SCALE / 100;

struct Fixture {
    state: LedgerSharedState,
    server: ChihRpcServer,
    vault: Arc<TokenVault>,
    clock: ManualClock,
    owner: Keypair,
}

fn fixture(mode: EmissionMode) -> Fixture {
    let vault = Arc::new(TokenVault::new("CHIH"));
    let clock = ManualClock::new(1_700_000_000);
    let owner = Keypair::generate();

    let mut pool = StakingPool::new(
        PoolConfig {
            staking_asset_id: "CHIH".to_string(),
            reward_asset_id: "CHIH".to_string(),
            owner: owner.account_id(),
            reward_rate: RATE,
            emission: mode,
        },
        vault.clone(),
        vault.clone(),
        Arc::new(clock.clone()),
    );

    // Reward reserve of one million tokens.
    let reserve = 1_000_000 * SCALE;
    vault.mint(&owner.account_id(), reserve).unwrap();
    vault.approve(&owner.account_id(), reserve).unwrap();
    pool.fund_rewards(&owner.account_id(), reserve).unwrap();
    pool.take_events();

    let state = LedgerSharedState::new(pool, vault.clone()).with_faucet(10_000 * SCALE);
    let server = ChihRpcServer::new(RpcConfig::default(), state.clone());
    Fixture {
        state,
        server,
        vault,
        clock,
        owner,
    }
}

fn funded(vault: &TokenVault, tokens: u128) -> Keypair {
    let kp = Keypair::generate();
    vault.mint(&kp.account_id(), tokens * SCALE).unwrap();
    vault.approve(&kp.account_id(), tokens * SCALE).unwrap();
    kp
}

async fn signed(
    server: &ChihRpcServer,
    kp: &Keypair,
    method: &str,
    field: Option<(&str, &str)>,
    nonce: u64,
) -> chih_rpc::JsonRpcResponse {
    let payload = field.map(|(_, v)| v).unwrap_or("");
    let auth = SignedCall::sign(kp, method, payload, nonce);
    let mut params = json!({ "auth": auth });
    if let Some((name, value)) = field {
        params[name] = json!(value);
    }
    server
        .handle(JsonRpcRequest {
            method: method.to_string(),
            params,
        })
        .await
}

async fn query(server: &ChihRpcServer, method: &str, account: &AccountId) -> serde_json::Value {
    let resp = server
        .handle(JsonRpcRequest {
            method: method.to_string(),
            params: json!({ "account": account.to_hex() }),
        })
        .await;
    assert!(resp.success, "{} failed: {:?}", method, resp.error);
    resp.result.unwrap()
}

// ---------------------------------------------------------------------------
// Concurrency
// ---------------------------------------------------------------------------

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_stakes_conserve_total() {
    let f = fixture(EmissionMode::PerStakedUnit);
    let stakers: Vec<AccountId> = (0..16)
        .map(|_| funded(&f.vault, 1_000).account_id())
        .collect();

    let mut handles = Vec::new();
    for (i, account) in stakers.iter().copied().enumerate() {
        let pool = f.state.pool.clone();
        handles.push(tokio::spawn(async move {
            for _ in 0..10 {
                pool.write().await.stake(&account, (i as u128 + 1) * SCALE).unwrap();
            }
            pool.write().await.withdraw(&account, SCALE).unwrap();
        }));
    }
    for h in handles {
        h.await.unwrap();
    }

    let pool = f.state.pool.read().await;
    pool.check_conservation().unwrap();
    let expected: u128 = (1..=16u128).map(|n| 10 * n * SCALE - SCALE).sum();
    assert_eq!(pool.total_staked(), expected);
    for (i, account) in stakers.iter().enumerate() {
        assert_eq!(pool.balance_of(account), 10 * (i as u128 + 1) * SCALE - SCALE);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_claims_never_double_pay() {
    let f = fixture(EmissionMode::PerStakedUnit);
    let alice = funded(&f.vault, 1_000);
    f.state
        .pool
        .write()
        .await
        .stake(&alice.account_id(), 1_000 * SCALE)
        .unwrap();
    f.clock.advance(100);

    let mut handles = Vec::new();
    for _ in 0..8 {
        let pool = f.state.pool.clone();
        let id = alice.account_id();
        handles.push(tokio::spawn(async move {
            pool.write().await.claim_rewards(&id).unwrap()
        }));
    }
    let mut total = 0;
    for h in handles {
        total += h.await.unwrap();
    }

    // 0.01 per staked token per second * 1000 tokens * 100 s.
    assert_eq!(total, 1_000 * SCALE);
    assert_eq!(f.vault.balance_of(&alice.account_id()).unwrap(), 1_000 * SCALE);
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_events_broadcast_in_commit_order() {
    let f = fixture(EmissionMode::PerStakedUnit);
    let mut rx = f.state.subscribe();
    let alice = funded(&f.vault, 1_000);

    let resp = signed(&f.server, &alice, "staking/stake", Some(("amount", "100")), 1).await;
    assert!(resp.success, "{:?}", resp.error);
    f.clock.advance(10);
    let resp = signed(&f.server, &alice, "staking/claim", None, 2).await;
    assert!(resp.success);
    let resp = signed(&f.server, &alice, "staking/withdraw", Some(("amount", "40")), 3).await;
    assert!(resp.success);

    let id = alice.account_id();
    assert_eq!(
        rx.recv().await.unwrap(),
        PoolEvent::Staked {
            account: id,
            amount: 100 * SCALE
        }
    );
    assert_eq!(
        rx.recv().await.unwrap(),
        PoolEvent::RewardPaid {
            account: id,
            amount: 10 * SCALE
        }
    );
    assert_eq!(
        rx.recv().await.unwrap(),
        PoolEvent::Withdrawn {
            account: id,
            amount: 40 * SCALE
        }
    );
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_rejected_calls_publish_nothing() {
    let f = fixture(EmissionMode::PerStakedUnit);
    let mut rx = f.state.subscribe();
    let alice = funded(&f.vault, 10);

    let resp = signed(&f.server, &alice, "staking/stake", Some(("amount", "0")), 1).await;
    assert!(!resp.success);
    let resp = signed(&f.server, &alice, "staking/withdraw", Some(("amount", "1")), 2).await;
    assert!(!resp.success);
    let resp = signed(&f.server, &alice, "staking/stake", Some(("amount", "11")), 3).await;
    assert!(!resp.success);
    assert!(resp.error.unwrap().contains("Transfer failed"));

    // Claim with nothing owed succeeds silently.
    let resp = signed(&f.server, &alice, "staking/claim", None, 4).await;
    assert!(resp.success);
    assert_eq!(resp.result.unwrap()["reward_paid"], "0");

    assert!(rx.try_recv().is_err());
}

// ---------------------------------------------------------------------------
// End-to-end flows
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_two_stakers_proportional_through_rpc() {
    let f = fixture(EmissionMode::PerStakedUnit);
    let a = funded(&f.vault, 1_000);
    let b = funded(&f.vault, 2_000);

    assert!(signed(&f.server, &a, "staking/stake", Some(("amount", "1000")), 1).await.success);
    assert!(signed(&f.server, &b, "staking/stake", Some(("amount", "2000")), 1).await.success);
    f.clock.advance(100);

    let ea = query(&f.server, "pool/earned", &a.account_id()).await;
    let eb = query(&f.server, "pool/earned", &b.account_id()).await;
    assert_eq!(ea["earned"], "1000");
    assert_eq!(eb["earned"], "2000");

    let acct = query(&f.server, "pool/account", &b.account_id()).await;
    assert_eq!(acct["staked"], "2000");
    assert_eq!(acct["exists"], true);
    assert!(acct["pool_share_percent"]
        .as_str()
        .unwrap()
        .starts_with("66.666666"));
}

#[tokio::test]
async fn test_rate_change_and_ownership_handover() {
    let f = fixture(EmissionMode::PerStakedUnit);
    let alice = funded(&f.vault, 1_000);
    let successor = Keypair::generate();

    assert!(signed(&f.server, &alice, "staking/stake", Some(("amount", "1000")), 1).await.success);
    f.clock.advance(100);

    // Alice cannot change the rate.
    let resp = signed(&f.server, &alice, "admin/set_reward_rate", Some(("rate", "1")), 2).await;
    assert!(!resp.success);

    // Owner doubles the rate, then hands over control.
    let resp = signed(&f.server, &f.owner, "admin/set_reward_rate", Some(("rate", "0.02")), 1).await;
    assert!(resp.success, "{:?}", resp.error);
    let successor_hex = successor.account_id().to_hex();
    let resp = signed(
        &f.server,
        &f.owner,
        "admin/transfer_ownership",
        Some(("new_owner", successor_hex.as_str())),
        2,
    )
    .await;
    assert!(resp.success, "{:?}", resp.error);

    f.clock.advance(50);
    // 100 s at 0.01 + 50 s at 0.02, on 1000 tokens.
    let earned = query(&f.server, "pool/earned", &alice.account_id()).await;
    assert_eq!(earned["earned"], "2000");

    // Former owner is locked out; successor is in.
    let resp = signed(&f.server, &f.owner, "admin/set_reward_rate", Some(("rate", "0")), 3).await;
    assert!(!resp.success);
    let resp = signed(&f.server, &successor, "admin/set_reward_rate", Some(("rate", "0")), 1).await;
    assert!(resp.success);

    let info = f
        .server
        .handle(JsonRpcRequest {
            method: "pool/info".to_string(),
            params: json!({}),
        })
        .await
        .result
        .unwrap();
    assert_eq!(info["owner"], successor_hex.as_str());
    assert_eq!(info["reward_rate"], "0");
}

#[tokio::test]
async fn test_faucet_approve_stake_exit() {
    let f = fixture(EmissionMode::PerStakedUnit);
    let user = Keypair::generate();

    let resp = signed(&f.server, &user, "vault/faucet", None, 1).await;
    assert!(resp.success, "{:?}", resp.error);
    assert_eq!(resp.result.unwrap()["balance"], "10000");
    // Second faucet call is refused.
    assert!(!signed(&f.server, &user, "vault/faucet", None, 2).await.success);

    assert!(signed(&f.server, &user, "vault/approve", Some(("amount", "500")), 3).await.success);
    assert!(signed(&f.server, &user, "staking/stake", Some(("amount", "500")), 4).await.success);
    f.clock.advance(20);

    let resp = signed(&f.server, &user, "staking/exit", None, 5).await;
    assert!(resp.success, "{:?}", resp.error);
    let result = resp.result.unwrap();
    assert_eq!(result["withdrawn"], "500");
    assert_eq!(result["reward_paid"], "100");

    let bal = query(&f.server, "vault/balance", &user.account_id()).await;
    assert_eq!(bal["balance"], "10100");

    // Nothing left to exit.
    assert!(!signed(&f.server, &user, "staking/exit", None, 6).await.success);
}

#[tokio::test]
async fn test_replayed_call_rejected() {
    let f = fixture(EmissionMode::PerStakedUnit);
    let alice = funded(&f.vault, 1_000);

    let auth = SignedCall::sign(&alice, "staking/stake", "10", 42);
    let request = JsonRpcRequest {
        method: "staking/stake".to_string(),
        params: json!({ "amount": "10", "auth": auth }),
    };
    assert!(f.server.handle(request.clone()).await.success);
    let replay = f.server.handle(request).await;
    assert!(!replay.success);
    assert!(replay.error.unwrap().contains("Stale nonce"));

    let pool = f.state.pool.read().await;
    assert_eq!(pool.balance_of(&alice.account_id()), 10 * SCALE);
}

#[tokio::test]
async fn test_fund_rewards_and_health() {
    let f = fixture(EmissionMode::PoolWide);
    let donor = funded(&f.vault, 50);

    let resp = signed(&f.server, &donor, "admin/fund_rewards", Some(("amount", "50")), 1).await;
    assert!(resp.success, "{:?}", resp.error);
    assert_eq!(f.vault.custody_balance().unwrap(), 1_000_050 * SCALE);

    let health = f
        .server
        .handle(JsonRpcRequest {
            method: "node/health".to_string(),
            params: json!({}),
        })
        .await
        .result
        .unwrap();
    assert_eq!(health["status"], "healthy");
    assert_eq!(health["custody_balance"], "1000050");
}

#[tokio::test]
async fn test_pool_wide_split_within_rounding_bound() {
    let f = fixture(EmissionMode::PoolWide);
    let a = funded(&f.vault, 1_000);
    let b = funded(&f.vault, 3_000);
    {
        let mut pool = f.state.pool.write().await;
        pool.stake(&a.account_id(), 1_000 * SCALE).unwrap();
        pool.stake(&b.account_id(), 3_000 * SCALE).unwrap();
    }
    f.clock.advance(333);

    let pool = f.state.pool.read().await;
    let emitted = RATE * 333;
    let ea = pool.earned(&a.account_id()).unwrap();
    let eb = pool.earned(&b.account_id()).unwrap();
    assert!(ea + eb <= emitted);
    // One accumulator advance and one settlement each.
    assert!(emitted / 4 - ea <= 1_000 + 1);
    assert!(emitted * 3 / 4 - eb <= 3_000 + 1);
}
