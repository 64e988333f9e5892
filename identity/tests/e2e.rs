//! End-to-end integration tests for the credential core.
//!
//! These tests drive whole authorities through their public API: creation
//! from seeds, delegation, signing, serialization in both modes, reloading,
//! revocation and symmetric key unlock. Each test builds its own in-memory
//! stores, so there is no shared state and no ordering dependency.

use std::sync::Arc;

use nym_identity::authority::{Authority, AuthorityError};
use nym_identity::claims::{ContactData, ContactItem, VerificationItem, VerificationSet};
use nym_identity::config::{AlgorithmSupport, AUTHORITY_VERSION, METADATA_UNSPECIFIED};
use nym_identity::credential::{Credential, CredentialRole, HasKeys};
use nym_identity::crypto::{PasswordPrompt, Secret, SymmetricKey};
use nym_identity::identifier::Identifier;
use nym_identity::keys::{Algorithm, AsymmetricKey, HdPath, Role};
use nym_identity::parameters::Parameters;
use nym_identity::proto::{AuthorityMode, SerializedAuthority};
use nym_identity::signature::SignatureRole;
use nym_identity::store::{
    CredentialContext, MemoryCredentialStore, MemorySeedStore, SeedStore,
};

// ---------------------------------------------------------------------------
// Test Helpers
// ---------------------------------------------------------------------------

fn prompt() -> PasswordPrompt {
    PasswordPrompt::with_password("e2e", Secret::from_text("correct horse battery staple"))
}

fn entropy(byte: u8) -> Secret {
    Secret::from_bytes(&[byte; 32])
}

/// Fresh authority over fresh in-memory stores, seeded with `entropy`.
fn authority_from(byte: u8) -> Authority {
    let mut params = Parameters::default();
    params.set_entropy(entropy(byte));
    Authority::new(
        CredentialContext::in_memory(),
        &params,
        AUTHORITY_VERSION,
        &prompt(),
    )
    .expect("authority")
}

fn contact_data() -> ContactData {
    ContactData::with_version(
        6,
        vec![
            ContactItem::new("identifier", "name", "Alice"),
            ContactItem::new("communication", "email", "alice@example.org"),
        ],
    )
}

fn first_key_credential(authority: &Authority) -> &Credential {
    let id = authority.key_credential_ids()[0];
    authority.get_credential(&id).expect("key credential")
}

fn private_encrypt_key(authority: &Authority) -> &AsymmetricKey {
    first_key_credential(authority)
        .keypair(Role::Encrypt)
        .expect("encrypt keypair")
        .private_key()
        .expect("private encrypt key")
}

// ---------------------------------------------------------------------------
// Determinism
// ---------------------------------------------------------------------------

#[test]
fn hd_derivation_is_deterministic() {
    let seed = entropy(7);
    let path = HdPath::nym_key(Identifier::hash(b"fingerprint"), 3, 0, 1, Role::Sign);
    for algorithm in [Algorithm::Secp256k1, Algorithm::Ed25519] {
        let a = AsymmetricKey::derive(algorithm, Role::Sign, &seed, &path, 2, &prompt()).unwrap();
        let b = AsymmetricKey::derive(algorithm, Role::Sign, &seed, &path, 2, &prompt()).unwrap();
        assert_eq!(a.public_key(), b.public_key());
        assert_eq!(
            a.private_key(&prompt()).unwrap().bytes(),
            b.private_key(&prompt()).unwrap().bytes()
        );
    }
}

#[test]
fn same_entropy_rebuilds_the_same_nym() {
    let a = authority_from(1);
    let b = authority_from(1);
    assert_eq!(a.nym_id(), b.nym_id());
    assert_eq!(a.master_id(), b.master_id());
    assert_eq!(a.key_credential_ids(), b.key_credential_ids());

    let c = authority_from(2);
    assert_ne!(a.nym_id(), c.nym_id());
}

#[test]
fn auto_index_allocates_distinct_nyms_from_one_seed() {
    let context = CredentialContext::in_memory();
    let mut params = Parameters::default();
    params.set_entropy(entropy(3));

    let first = Authority::new(context.clone(), &params, AUTHORITY_VERSION, &prompt()).unwrap();
    let second = Authority::new(context.clone(), &params, AUTHORITY_VERSION, &prompt()).unwrap();
    assert_eq!(first.path().unwrap().nym(), Some(0));
    assert_eq!(second.path().unwrap().nym(), Some(1));
    assert_ne!(first.nym_id(), second.nym_id());
}

#[test]
fn explicit_nym_disables_auto_index() {
    let seeds = Arc::new(MemorySeedStore::new());
    let fingerprint = seeds.import_seed(&entropy(4)).unwrap();
    let context = CredentialContext::new(seeds.clone(), Arc::new(MemoryCredentialStore::new()));

    let params = Parameters::from_seed(fingerprint, 9);
    assert!(!params.auto_index());
    let authority = Authority::new(context, &params, AUTHORITY_VERSION, &prompt()).unwrap();
    assert_eq!(authority.path().unwrap().nym(), Some(9));
    // The store's counter was never touched.
    assert_eq!(seeds.next_nym_index(&fingerprint).unwrap(), 0);
}

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

#[test]
fn credential_ids_survive_round_trips() {
    let mut authority = authority_from(5);
    authority
        .add_contact_credential(&contact_data(), &prompt())
        .unwrap();

    for id in std::iter::once(*authority.master_id()).chain(authority.child_ids()) {
        let credential = authority.get_credential(&id).unwrap();
        for include_private in [false, true] {
            let json = serde_json::to_string(&credential.serialize(include_private)).unwrap();
            let loaded = Credential::from_serialized(&serde_json::from_str(&json).unwrap()).unwrap();
            assert_eq!(loaded.id(), &id);
            let again = Credential::from_serialized(&loaded.serialize(include_private)).unwrap();
            assert_eq!(again.id(), &id);
        }
    }
}

// ---------------------------------------------------------------------------
// Index
// ---------------------------------------------------------------------------

#[test]
fn index_never_decreases_or_repeats() {
    let mut authority = authority_from(6);
    let mut seen = authority.key_credential_ids();
    let mut last = authority.index();
    assert_eq!(last, 2);

    let mut check = |authority: &Authority| {
        assert!(authority.index() >= last);
        last = authority.index();
    };

    let child = authority
        .add_child_key_credential(&Parameters::default(), &prompt())
        .unwrap();
    check(&authority);
    assert!(!seen.contains(&child));
    seen.push(child);

    authority
        .add_contact_credential(&contact_data(), &prompt())
        .unwrap();
    authority.revoke_contact_credentials();
    check(&authority);

    authority
        .add_verification_credential(&VerificationSet::new(Vec::new()), &prompt())
        .unwrap();
    authority.revoke_verification_credentials();
    check(&authority);

    assert!(authority.revoke_child_key_credential(&child));
    check(&authority);

    let replacement = authority
        .add_child_key_credential(&Parameters::default(), &prompt())
        .unwrap();
    check(&authority);
    assert!(!seen.contains(&replacement));
    assert_eq!(authority.index(), 4);
}

#[test]
fn failed_child_creation_still_burns_the_index() {
    let mut authority = authority_from(8);
    authority.set_algorithm_support(AlgorithmSupport {
        secp256k1: false,
        ed25519: false,
        rsa: false,
    });
    let before = authority.index();
    assert!(matches!(
        authority.add_child_key_credential(&Parameters::default(), &prompt()),
        Err(AuthorityError::NoSupportedAlgorithm)
    ));
    assert_eq!(authority.index(), before + 1);
    assert_eq!(authority.key_credential_ids().len(), 1);
}

// ---------------------------------------------------------------------------
// Delegation
// ---------------------------------------------------------------------------

#[test]
fn master_signatures_never_verify_as_messages() {
    let authority = authority_from(9);
    let forged = authority
        .master()
        .sign(b"pay bob", SignatureRole::Message, Role::Sign, &prompt())
        .unwrap();
    assert_eq!(forged.credential_id, *authority.master_id());
    assert!(authority.master().verify_signature(b"pay bob", &forged, Role::Sign));
    assert!(!authority.verify(b"pay bob", &forged, Role::Sign));
}

#[test]
fn children_of_another_master_do_not_verify() {
    let alice = authority_from(10);
    let bob = authority_from(11);
    let sig = alice
        .sign(b"hello", SignatureRole::Message, Role::Sign, &prompt())
        .unwrap();
    assert!(alice.verify(b"hello", &sig, Role::Sign));
    assert!(!bob.verify(b"hello", &sig, Role::Sign));
}

// ---------------------------------------------------------------------------
// Algorithm fallback
// ---------------------------------------------------------------------------

#[test]
fn default_children_are_secp256k1() {
    let mut authority = authority_from(12);
    authority
        .add_child_key_credential(&Parameters::with_key_size(1024), &prompt())
        .unwrap();
    let (_, algorithms) = authority.encryption_targets();
    assert_eq!(algorithms, vec![Algorithm::Secp256k1]);
}

#[test]
fn fallback_walks_secp256k1_ed25519_rsa() {
    let context = CredentialContext::in_memory()
        .with_support(AlgorithmSupport::ALL.without(Algorithm::Secp256k1));
    let mut params = Parameters::default();
    params.set_entropy(entropy(13));
    let mut authority = Authority::new(context, &params, AUTHORITY_VERSION, &prompt()).unwrap();
    assert_eq!(authority.encryption_targets().1, vec![Algorithm::Ed25519]);

    authority.set_algorithm_support(
        AlgorithmSupport::ALL
            .without(Algorithm::Secp256k1)
            .without(Algorithm::Ed25519),
    );
    let rsa_id = authority
        .add_child_key_credential(&Parameters::with_key_size(1024), &prompt())
        .unwrap();
    let rsa = authority.get_credential(&rsa_id).unwrap();
    assert_eq!(
        rsa.public_key(Role::Sign).unwrap().algorithm(),
        Algorithm::Rsa
    );
    assert!(rsa.public_key(Role::Sign).unwrap().path().is_none());

    let (_, algorithms) = authority.encryption_targets();
    assert_eq!(algorithms.len(), 2);
    assert!(algorithms.contains(&Algorithm::Ed25519));
    assert!(algorithms.contains(&Algorithm::Rsa));
    assert!(authority.verify_internally());
}

#[test]
fn reloaded_hd_authority_without_its_seed_falls_back_to_rsa() {
    let authority = authority_from(15);
    let serialized = authority.serialize(AuthorityMode::Full);
    let mut reloaded =
        Authority::load(CredentialContext::in_memory(), authority.source(), &serialized).unwrap();
    assert!(reloaded.path().is_some());
    let index = reloaded.index();

    let id = reloaded
        .add_child_key_credential(&Parameters::with_key_size(1024), &prompt())
        .unwrap();
    let child = reloaded.get_credential(&id).unwrap();
    let sign_key = child.public_key(Role::Sign).unwrap();
    assert_eq!(sign_key.algorithm(), Algorithm::Rsa);
    assert!(sign_key.path().is_none());
    assert_eq!(reloaded.index(), index + 1);
    assert!(reloaded.verify_internally());

    let sig = reloaded
        .sign(b"after reload", SignatureRole::Message, Role::Sign, &prompt())
        .unwrap();
    assert!(reloaded.verify(b"after reload", &sig, Role::Sign));
}

#[test]
fn reloaded_hd_authority_without_seed_or_rsa_fails() {
    let authority = authority_from(16);
    let serialized = authority.serialize(AuthorityMode::Full);
    let context =
        CredentialContext::in_memory().with_support(AlgorithmSupport::ALL.without(Algorithm::Rsa));
    let mut reloaded = Authority::load(context, authority.source(), &serialized).unwrap();
    let index = reloaded.index();
    assert!(matches!(
        reloaded.add_child_key_credential(&Parameters::default(), &prompt()),
        Err(AuthorityError::NoSupportedAlgorithm)
    ));
    assert_eq!(reloaded.index(), index + 1);
}

// ---------------------------------------------------------------------------
// Signature metadata
// ---------------------------------------------------------------------------

#[test]
fn metadata_less_signatures_need_a_key_hint() {
    let authority = authority_from(14);
    let sig = authority
        .sign(b"msg", SignatureRole::Message, Role::Sign, &prompt())
        .unwrap();
    assert!(sig.has_metadata());

    let mut out = Vec::new();
    assert_eq!(
        authority.get_public_keys_by_signature(&mut out, &sig, METADATA_UNSPECIFIED),
        1
    );
    assert!(out[0].verify(b"msg", &sig.signature));

    let bare = sig.without_metadata();
    let mut out = Vec::new();
    assert_eq!(
        authority.get_public_keys_by_signature(&mut out, &bare, METADATA_UNSPECIFIED),
        0
    );
    assert!(out.is_empty());

    let mut out = Vec::new();
    assert!(authority.get_public_keys_by_signature(&mut out, &bare, 'A') >= 1);
    assert_eq!(out[0].role(), Role::Auth);
}

// ---------------------------------------------------------------------------
// Serialization
// ---------------------------------------------------------------------------

#[test]
fn full_round_trip_rebuilds_the_same_authority() {
    let mut authority = authority_from(15);
    authority
        .add_contact_credential(&contact_data(), &prompt())
        .unwrap();
    let claim = authority
        .sign_verification(Identifier::hash(b"someone's claim"), true, &prompt())
        .unwrap();
    authority
        .add_verification_credential(&VerificationSet::new(vec![claim]), &prompt())
        .unwrap();

    let json = serde_json::to_string(&authority.serialize(AuthorityMode::Full)).unwrap();
    let serialized: SerializedAuthority = serde_json::from_str(&json).unwrap();
    assert!(serialized.active_child_ids.is_empty());
    assert_eq!(serialized.active_children.len(), 3);

    let loaded =
        Authority::load(CredentialContext::in_memory(), authority.source(), &serialized).unwrap();
    assert_eq!(loaded.master_id(), authority.master_id());
    assert_eq!(loaded.nym_id(), authority.nym_id());
    assert_eq!(loaded.child_ids(), authority.child_ids());
    assert_eq!(loaded.index(), authority.index());
    assert_eq!(loaded.get_contact_data(), authority.get_contact_data());
    assert!(loaded.verify_internally());

    // The private halves came along, so the copy can still sign.
    let sig = loaded
        .sign(b"still me", SignatureRole::Message, Role::Sign, &prompt())
        .unwrap();
    assert!(authority.verify(b"still me", &sig, Role::Sign));
}

#[test]
fn index_round_trip_resolves_through_the_store() {
    let credentials = Arc::new(MemoryCredentialStore::new());
    let context = CredentialContext::new(Arc::new(MemorySeedStore::new()), credentials.clone());
    let mut authority = Authority::new(context.clone(), &Parameters::default(), 6, &prompt())
        .unwrap();
    authority
        .add_contact_credential(&contact_data(), &prompt())
        .unwrap();
    authority.revoke_contact_credentials();

    let serialized = authority.serialize(AuthorityMode::Index);
    assert!(serialized.master_credential.is_none());
    assert_eq!(serialized.revoked_child_ids.len(), 1);

    let loaded = Authority::load(context.clone(), authority.source(), &serialized).unwrap();
    assert_eq!(loaded.child_ids(), authority.child_ids());
    assert_eq!(loaded.revoked_ids(), authority.revoked_ids());
    assert!(loaded.verify_internally());

    // One missing body fails the whole load.
    credentials.remove(&serialized.active_child_ids[0]);
    assert!(matches!(
        Authority::load(context, authority.source(), &serialized),
        Err(AuthorityError::MissingCredential(_))
    ));
}

#[test]
fn load_rejects_foreign_and_tampered_authorities() {
    let alice = authority_from(16);
    let bob = authority_from(17);
    let serialized = alice.serialize(AuthorityMode::Full);

    assert!(matches!(
        Authority::load(CredentialContext::in_memory(), bob.source(), &serialized),
        Err(AuthorityError::NymIdMismatch)
    ));

    let mut tampered = serialized.clone();
    let child = &mut tampered.active_children[0];
    let last = child.signatures.len() - 1;
    child.signatures[last].signature[0] ^= 0xff;
    assert!(Authority::load(CredentialContext::in_memory(), alice.source(), &tampered).is_err());

    let mut smuggled = serialized;
    smuggled
        .active_children
        .push(bob.serialize(AuthorityMode::Full).active_children[0].clone());
    assert!(Authority::load(CredentialContext::in_memory(), alice.source(), &smuggled).is_err());
}

// ---------------------------------------------------------------------------
// Unlock
// ---------------------------------------------------------------------------

#[test]
fn unlock_with_matching_tag() {
    let alice = authority_from(18);
    let bob = authority_from(19);
    let alice_private = private_encrypt_key(&alice);
    let bob_private = private_encrypt_key(&bob);
    let alice_public = alice.get_public_key(Role::Encrypt).unwrap();
    let bob_public = bob.get_public_key(Role::Encrypt).unwrap();
    let domain = *bob.master_id();

    let tag = alice_private
        .calculate_tag(bob_public, &domain, &prompt())
        .unwrap();
    assert_eq!(
        tag,
        bob_private
            .calculate_tag(alice_public, &domain, &prompt())
            .unwrap()
    );

    let password = alice_private
        .calculate_session_password(bob_public, &prompt())
        .unwrap();
    let sent = SymmetricKey::generate(&password).unwrap();
    let sealed = sent.encrypt(b"for bob only").unwrap();
    let wire = serde_json::to_string(&sent).unwrap();

    let mut received: SymmetricKey = serde_json::from_str(&wire).unwrap();
    assert!(bob.unlock(alice_public, tag, Algorithm::Secp256k1, &mut received, &prompt()));
    assert_eq!(received.decrypt(&sealed).unwrap(), b"for bob only");

    let mut received: SymmetricKey = serde_json::from_str(&wire).unwrap();
    assert!(!bob.unlock(
        alice_public,
        tag ^ 1,
        Algorithm::Secp256k1,
        &mut received,
        &prompt()
    ));
    assert!(!received.is_unlocked());

    let mut received: SymmetricKey = serde_json::from_str(&wire).unwrap();
    assert!(!bob.unlock(alice_public, tag, Algorithm::Ed25519, &mut received, &prompt()));
}

#[test]
fn encryption_targets_name_the_master() {
    let authority = authority_from(20);
    let (master, algorithms) = authority.encryption_targets();
    assert_eq!(&master, authority.master_id());
    assert_eq!(algorithms, vec![Algorithm::Secp256k1]);
}

// ---------------------------------------------------------------------------
// Claims
// ---------------------------------------------------------------------------

#[test]
fn verifications_of_claims_are_checkable_by_the_issuer() {
    let alice = authority_from(21);
    let bob = authority_from(22);
    let claim = ContactItem::new("identifier", "name", "Alice").claim_id(alice.nym_id());

    let item: VerificationItem = bob.sign_verification(claim, true, &prompt()).unwrap();
    assert!(bob.verify_verification(&item));
    assert!(!alice.verify_verification(&item));
}

// ---------------------------------------------------------------------------
// Version 6
// ---------------------------------------------------------------------------

#[test]
fn version_six_scenario() {
    let mut authority = Authority::new(
        CredentialContext::in_memory(),
        &Parameters::default(),
        6,
        &prompt(),
    )
    .unwrap();
    assert_eq!(authority.index(), 2);
    let key_id = authority.key_credential_ids()[0];
    assert_eq!(
        authority
            .get_credential(&key_id)
            .unwrap()
            .public_key(Role::Sign)
            .unwrap()
            .algorithm(),
        Algorithm::Secp256k1
    );

    let contact_id = authority
        .add_contact_credential(&contact_data(), &prompt())
        .unwrap();
    assert_eq!(authority.version(), 6);
    assert_eq!(authority.get_contact_data().unwrap().version, 6);

    let serialized = authority.serialize(AuthorityMode::Index);
    assert_eq!(serialized.version, 6);
    assert_eq!(serialized.master_id, *authority.master_id());
    assert_eq!(serialized.nym_id, *authority.nym_id());
    assert_eq!(serialized.active_child_ids.len(), 2);
    assert_eq!(serialized.active_child_ids[0], key_id);
    assert_eq!(serialized.active_child_ids[1], contact_id);
    assert_eq!(
        authority.get_credential(&contact_id).unwrap().role(),
        CredentialRole::Contact
    );
}

#[test]
fn contact_data_upgrades_an_old_authority() {
    let mut authority = Authority::new(
        CredentialContext::in_memory(),
        &Parameters::default(),
        4,
        &prompt(),
    )
    .unwrap();
    assert_eq!(authority.version(), 4);
    authority
        .add_contact_credential(&contact_data(), &prompt())
        .unwrap();
    assert_eq!(authority.version(), 6);
    assert!(authority.verify_internally());
}
