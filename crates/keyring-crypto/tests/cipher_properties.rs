//! Property-based tests for sealing and key derivation

use keyring_crypto::{
    CipherError, KEY_LEN, NONCE_LEN, decrypt_with_key, encrypt_with_key, hkdf_key, pbkdf2_key,
    seal_with_nonce, sealed_len,
};
use proptest::prelude::*;

fn arbitrary_key() -> impl Strategy<Value = [u8; KEY_LEN]> {
    any::<[u8; KEY_LEN]>()
}

proptest! {
    #[test]
    fn seal_open_roundtrip(
        key in arbitrary_key(),
        plaintext in prop::collection::vec(any::<u8>(), 0..1024),
        aad in prop::collection::vec(any::<u8>(), 0..32),
    ) {
        let sealed = encrypt_with_key(&key, &plaintext, &aad).expect("encrypt should succeed");
        prop_assert_eq!(sealed.len(), sealed_len(plaintext.len()));

        let opened = decrypt_with_key(&key, &sealed, &aad).expect("decrypt should succeed");
        prop_assert_eq!(&opened[..], &plaintext[..]);
    }

    #[test]
    fn any_bit_flip_fails_authentication(
        key in arbitrary_key(),
        nonce in any::<[u8; NONCE_LEN]>(),
        plaintext in prop::collection::vec(any::<u8>(), 1..256),
        position in any::<prop::sample::Index>(),
        bit in 0u8..8,
    ) {
        let mut sealed = seal_with_nonce(&key, &nonce, &plaintext, &[]).expect("seal should succeed");
        let position = position.index(sealed.len());
        sealed[position] ^= 1 << bit;

        // PROPERTY: Damage anywhere (nonce, body, tag) is an opaque auth failure
        prop_assert_eq!(decrypt_with_key(&key, &sealed, &[]), Err(CipherError::DecryptionFailed));
    }

    #[test]
    fn wrong_key_never_opens(
        key in arbitrary_key(),
        other in arbitrary_key(),
        plaintext in prop::collection::vec(any::<u8>(), 0..128),
    ) {
        prop_assume!(key != other);
        let sealed = encrypt_with_key(&key, &plaintext, &[]).expect("encrypt should succeed");
        prop_assert_eq!(decrypt_with_key(&other, &sealed, &[]), Err(CipherError::DecryptionFailed));
    }

    #[test]
    fn derivations_produce_requested_length(
        passphrase in prop::collection::vec(any::<u8>(), 0..64),
        salt in prop::collection::vec(any::<u8>(), 0..64),
        n in 1usize..128,
    ) {
        prop_assert_eq!(hkdf_key(&passphrase, &salt, n).len(), n);
        prop_assert_eq!(pbkdf2_key(&passphrase, &salt, 1, n).len(), n);
    }
}
