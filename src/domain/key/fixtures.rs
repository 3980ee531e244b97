//! Asymmetric key material for tests, generated once per test binary

use ed25519_dalek::pkcs8::{EncodePrivateKey as _, EncodePublicKey as _, KeypairBytes};
use ed25519_dalek::SigningKey;
use once_cell::sync::Lazy;
use p256::pkcs8::{EncodePrivateKey, EncodePublicKey, LineEnding};
use rand::rngs::OsRng;
use rsa::pkcs1::{EncodeRsaPrivateKey, EncodeRsaPublicKey};
use rsa::RsaPrivateKey;

pub struct PemPair {
    pub private_pem: String,
    pub public_pem: String,
}

pub static RSA_KEY: Lazy<PemPair> = Lazy::new(generate_rsa_pem);

pub static OTHER_RSA_KEY: Lazy<PemPair> = Lazy::new(generate_rsa_pem);

/// P-256 pair for ES256
pub static EC_KEY: Lazy<PemPair> = Lazy::new(generate_ec_pem);

/// Ed25519 pair for EdDSA
pub static ED_KEY: Lazy<PemPair> = Lazy::new(generate_ed_pem);

fn generate_rsa_pem() -> PemPair {
    let mut rng = OsRng;
    let private_key = RsaPrivateKey::new(&mut rng, 2048).unwrap();
    let private_pem = private_key
        .to_pkcs1_pem(rsa::pkcs1::LineEnding::LF)
        .unwrap();
    let public_pem = private_key
        .to_public_key()
        .to_pkcs1_pem(rsa::pkcs1::LineEnding::LF)
        .unwrap();

    PemPair {
        private_pem: private_pem.to_string(),
        public_pem,
    }
}

fn generate_ec_pem() -> PemPair {
    let secret_key = p256::SecretKey::random(&mut OsRng);
    let private_pem = secret_key.to_pkcs8_pem(LineEnding::LF).unwrap();
    let public_pem = secret_key
        .public_key()
        .to_public_key_pem(LineEnding::LF)
        .unwrap();

    PemPair {
        private_pem: private_pem.to_string(),
        public_pem,
    }
}

fn generate_ed_pem() -> PemPair {
    let signing_key = SigningKey::generate(&mut OsRng);
    // PKCS#8 v1, without the embedded public key
    let keypair = KeypairBytes {
        secret_key: signing_key.to_bytes(),
        public_key: None,
    };
    let private_pem = keypair.to_pkcs8_pem(LineEnding::LF).unwrap();
    let public_pem = signing_key
        .verifying_key()
        .to_public_key_pem(LineEnding::LF)
        .unwrap();

    PemPair {
        private_pem: private_pem.to_string(),
        public_pem,
    }
}
