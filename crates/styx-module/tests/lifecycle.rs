//! End-to-end lifecycle tests for the will module.
//!
//! Walks the full dead-man's-switch flow with deterministic keys:
//!
//! 1. Owner sets a will on a safe with the module enabled
//! 2. Owner pre-signs the authorization for the current nonce
//! 3. Execution fails before the timeframe elapses, succeeds after
//! 4. Abort invalidates an outstanding pre-signature
//! 5. Serialized ordering resolves execute/execute and abort/execute races

use styx_core::test_utils::{test_address, test_keypair, test_signer_address};
use styx_core::{sign_will, Address, SealKey, SealedPayload, Signature, SigningDomain};
use styx_module::{EngineError, ExecutionEngine, Fact, LocalSafe, SafeCapability, TxContext};

const CHAIN_ID: u64 = 1;
const MODULE: u8 = 0x70;
const TIMEFRAME: u64 = 1000;
const TIP: u128 = 1;

struct Fixture {
    engine: ExecutionEngine,
    safe: LocalSafe,
    safe_addr: Address,
    owner: Address,
    owner_sk: secp256k1::SecretKey,
    heir: Address,
    executor: Address,
}

fn setup() -> Fixture {
    let (owner_sk, _) = test_keypair(1);
    let owner = test_signer_address(1);
    let heir = test_address(3);
    let executor = test_address(9);
    let safe_addr = test_address(0x50);

    let mut safe = LocalSafe::new(vec![owner, test_address(0x51)]);
    safe.enable_module(test_address(MODULE));

    let engine = ExecutionEngine::new(SigningDomain::styx(CHAIN_ID, test_address(MODULE)));

    Fixture {
        engine,
        safe,
        safe_addr,
        owner,
        owner_sk,
        heir,
        executor,
    }
}

fn sealed() -> SealedPayload {
    SealedPayload::seal(&SealKey::generate(), b"pre-signed authorization").unwrap()
}

fn set_will_at(f: &mut Fixture, now: u64) {
    f.engine
        .set_will(
            &TxContext::new(f.owner, TIP, now),
            f.safe_addr,
            &f.safe,
            f.heir,
            TIMEFRAME,
            sealed(),
        )
        .unwrap();
}

fn current_authorization(f: &Fixture) -> Signature {
    let nonce = f.engine.get_nonce(&f.owner, &f.safe_addr);
    sign_will(
        &f.owner_sk,
        f.engine.verifier().domain(),
        &f.heir,
        &f.safe_addr,
        nonce,
    )
}

#[test]
fn immediate_execution_fails_not_yet_expired() {
    let mut f = setup();
    set_will_at(&mut f, 100);
    let sig = current_authorization(&f);

    let err = f
        .engine
        .execute_will(
            &TxContext::new(f.executor, 0, 100),
            &sig,
            &f.owner,
            f.safe_addr,
            &mut f.safe,
        )
        .unwrap_err();

    assert!(matches!(err, EngineError::NotYetExpired { .. }));
    assert!(f.safe.is_owner(&f.owner));
}

#[test]
fn execution_after_timeframe_transfers_ownership_and_pays_tip() {
    let mut f = setup();
    set_will_at(&mut f, 100);
    let sig = current_authorization(&f);

    f.engine
        .execute_will(
            &TxContext::new(f.executor, 0, 100 + TIMEFRAME + 1),
            &sig,
            &f.owner,
            f.safe_addr,
            &mut f.safe,
        )
        .unwrap();

    assert!(f.safe.is_owner(&f.heir));
    assert!(!f.safe.is_owner(&f.owner));
    assert_eq!(f.engine.balance_of(&f.executor), TIP);
    assert!(!f.engine.will_exists(&f.owner, &f.safe_addr));

    let facts = f.engine.facts();
    assert!(matches!(facts.last(), Some(Fact::WillExecuted { .. })));
}

#[test]
fn abort_invalidates_outstanding_signature() {
    let mut f = setup();
    set_will_at(&mut f, 100);
    let sig = current_authorization(&f);

    f.engine
        .abort_will(&TxContext::new(f.owner, 0, 200), f.safe_addr)
        .unwrap();
    assert!(!f.engine.will_exists(&f.owner, &f.safe_addr));

    // Owner re-arms the will; the old signature is bound to a superseded
    // nonce and must be rejected even though the timeframe has elapsed.
    set_will_at(&mut f, 300);
    let err = f
        .engine
        .execute_will(
            &TxContext::new(f.executor, 0, 300 + TIMEFRAME + 1),
            &sig,
            &f.owner,
            f.safe_addr,
            &mut f.safe,
        )
        .unwrap_err();

    assert!(matches!(err, EngineError::InvalidSignature(_)));
    assert!(f.safe.is_owner(&f.owner));
}

#[test]
fn replayed_signature_rejected_after_execution() {
    let mut f = setup();
    set_will_at(&mut f, 100);
    let sig = current_authorization(&f);
    let now = 100 + TIMEFRAME + 1;

    f.engine
        .execute_will(
            &TxContext::new(f.executor, 0, now),
            &sig,
            &f.owner,
            f.safe_addr,
            &mut f.safe,
        )
        .unwrap();

    // Second execution with the same signature observes a cleared record.
    let err = f
        .engine
        .execute_will(
            &TxContext::new(f.executor, 0, now + 1),
            &sig,
            &f.owner,
            f.safe_addr,
            &mut f.safe,
        )
        .unwrap_err();
    assert!(matches!(err, EngineError::Registry(_)));

    // Exactly one payout happened.
    assert_eq!(f.engine.balance_of(&f.executor), TIP);
}

#[test]
fn abort_ordered_before_execute_wins() {
    let mut f = setup();
    set_will_at(&mut f, 100);
    let sig = current_authorization(&f);
    let now = 100 + TIMEFRAME + 1;

    // Both transactions are in flight; the ledger orders the abort first.
    f.engine
        .abort_will(&TxContext::new(f.owner, 0, now), f.safe_addr)
        .unwrap();

    let err = f
        .engine
        .execute_will(
            &TxContext::new(f.executor, 0, now),
            &sig,
            &f.owner,
            f.safe_addr,
            &mut f.safe,
        )
        .unwrap_err();

    assert!(matches!(err, EngineError::Registry(_)));
    assert!(f.safe.is_owner(&f.owner));
    assert_eq!(f.engine.balance_of(&f.owner), TIP); // refunded, not paid out
}

#[test]
fn execute_ordered_before_abort_wins() {
    let mut f = setup();
    set_will_at(&mut f, 100);
    let sig = current_authorization(&f);
    let now = 100 + TIMEFRAME + 1;

    f.engine
        .execute_will(
            &TxContext::new(f.executor, 0, now),
            &sig,
            &f.owner,
            f.safe_addr,
            &mut f.safe,
        )
        .unwrap();

    let err = f
        .engine
        .abort_will(&TxContext::new(f.owner, 0, now), f.safe_addr)
        .unwrap_err();

    assert!(matches!(err, EngineError::Registry(_)));
    assert!(f.safe.is_owner(&f.heir));
}

#[test]
fn disabled_module_blocks_execution_regardless_of_validity() {
    let mut f = setup();
    set_will_at(&mut f, 100);
    let sig = current_authorization(&f);

    // Owner (still alive, still paranoid) revokes the module link.
    let module = *f.engine.module();
    f.safe.disable_module(&module);

    let err = f
        .engine
        .execute_will(
            &TxContext::new(f.executor, 0, 100 + TIMEFRAME + 1),
            &sig,
            &f.owner,
            f.safe_addr,
            &mut f.safe,
        )
        .unwrap_err();

    assert_eq!(err, EngineError::ModuleDisabled(module));
    assert!(f.engine.will_exists(&f.owner, &f.safe_addr));
}

#[test]
fn signature_for_other_safe_rejected() {
    let mut f = setup();
    set_will_at(&mut f, 100);

    let nonce = f.engine.get_nonce(&f.owner, &f.safe_addr);
    let other_safe = test_address(0x60);
    let sig = sign_will(
        &f.owner_sk,
        f.engine.verifier().domain(),
        &f.heir,
        &other_safe,
        nonce,
    );

    let err = f
        .engine
        .execute_will(
            &TxContext::new(f.executor, 0, 100 + TIMEFRAME + 1),
            &sig,
            &f.owner,
            f.safe_addr,
            &mut f.safe,
        )
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidSignature(_)));
}

#[test]
fn sealed_payload_roundtrips_through_fact() {
    let mut f = setup();

    let key = SealKey::generate();
    let sig_plaintext = b"the owner's pre-signature bytes".to_vec();
    let payload = SealedPayload::seal(&key, &sig_plaintext).unwrap();

    f.engine
        .set_will(
            &TxContext::new(f.owner, TIP, 100),
            f.safe_addr,
            &f.safe,
            f.heir,
            TIMEFRAME,
            payload,
        )
        .unwrap();

    // An observer reading the emitted fact (as the decryption network's
    // clients do) can open the payload once given the key.
    let facts = f.engine.drain_facts();
    match facts.first() {
        Some(Fact::WillSet { payload, .. }) => {
            assert_eq!(payload.open(&key).unwrap(), sig_plaintext);
        }
        other => panic!("expected WillSet fact, got {:?}", other),
    }
}
