//! JWK to RSA public key conversion.
//!
//! A published key carries its modulus and exponent as unpadded base64url
//! big-endian integers. Conversion decodes both and hands the raw components
//! to jsonwebtoken. Beyond decoding, the only check is that the exponent fits
//! in a machine word; modulus length and key type are not validated, the key
//! set being trusted through the transport that delivered it.

use crate::auth::jwks::Jwk;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use jsonwebtoken::DecodingKey;
use std::fmt;
use thiserror::Error;

/// Widest exponent accepted, in bytes, after leading zeros are stripped.
pub const MAX_EXPONENT_BYTES: usize = std::mem::size_of::<u64>();

/// Errors produced while converting a JWK.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyConversionError {
    #[error("failed to decode modulus: {0}")]
    Modulus(base64::DecodeError),

    #[error("failed to decode exponent: {0}")]
    Exponent(base64::DecodeError),

    #[error("exponent is {bytes} bytes, wider than {max}", max = MAX_EXPONENT_BYTES)]
    ExponentTooLarge { bytes: usize },
}

/// A converted, ready-to-verify RSA public key.
#[derive(Clone)]
pub struct PublicKeyMaterial {
    decoding_key: DecodingKey,
    modulus_bits: usize,
    exponent: u64,
}

impl PublicKeyMaterial {
    /// Build from big-endian modulus and exponent bytes.
    ///
    /// Leading zero bytes are dropped; the verifier wants minimal encodings.
    pub fn from_components(modulus: &[u8], exponent: &[u8]) -> Result<Self, KeyConversionError> {
        let exponent_digits = strip_leading_zeros(exponent);
        if exponent_digits.len() > MAX_EXPONENT_BYTES {
            return Err(KeyConversionError::ExponentTooLarge {
                bytes: exponent_digits.len(),
            });
        }
        let exponent_value = exponent_digits
            .iter()
            .fold(0u64, |acc, byte| (acc << 8) | u64::from(*byte));

        let modulus_digits = strip_leading_zeros(modulus);
        let modulus_bits = modulus_digits
            .first()
            .map(|top| (modulus_digits.len() - 1) * 8 + (8 - top.leading_zeros() as usize))
            .unwrap_or(0);

        Ok(Self {
            decoding_key: DecodingKey::from_rsa_raw_components(modulus_digits, exponent_digits),
            modulus_bits,
            exponent: exponent_value,
        })
    }

    /// Key for jsonwebtoken signature verification.
    pub fn decoding_key(&self) -> &DecodingKey {
        &self.decoding_key
    }

    /// Significant bits in the modulus.
    pub fn modulus_bits(&self) -> usize {
        self.modulus_bits
    }

    /// The public exponent.
    pub fn exponent(&self) -> u64 {
        self.exponent
    }
}

impl fmt::Debug for PublicKeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublicKeyMaterial")
            .field("modulus_bits", &self.modulus_bits)
            .field("exponent", &self.exponent)
            .finish_non_exhaustive()
    }
}

/// Convert one published key into verification material.
///
/// # Errors
///
/// Returns `KeyConversionError::Modulus` or `KeyConversionError::Exponent`
/// naming the field that is not valid unpadded base64url, and
/// `KeyConversionError::ExponentTooLarge` if the exponent exceeds
/// [`MAX_EXPONENT_BYTES`].
pub fn convert_jwk(jwk: &Jwk) -> Result<PublicKeyMaterial, KeyConversionError> {
    let modulus = URL_SAFE_NO_PAD
        .decode(&jwk.n)
        .map_err(KeyConversionError::Modulus)?;
    let exponent = URL_SAFE_NO_PAD
        .decode(&jwk.e)
        .map_err(KeyConversionError::Exponent)?;

    PublicKeyMaterial::from_components(&modulus, &exponent)
}

fn strip_leading_zeros(bytes: &[u8]) -> &[u8] {
    let first_significant = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
    bytes.get(first_significant..).unwrap_or_default()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use auth_test_utils::crypto_fixtures::{TEST_KEY_1, TEST_KEY_2};
    use jsonwebtoken::{decode, encode, Algorithm, EncodingKey, Header, Validation};
    use serde_json::{json, Map, Value};

    fn jwk(n: &str, e: &str) -> Jwk {
        Jwk {
            kty: "RSA".to_string(),
            kid: "test".to_string(),
            key_use: "sig".to_string(),
            alg: None,
            n: n.to_string(),
            e: e.to_string(),
        }
    }

    fn sign(private_key_pem: &str) -> String {
        let key = EncodingKey::from_rsa_pem(private_key_pem.as_bytes()).unwrap();
        encode(
            &Header::new(Algorithm::RS256),
            &json!({"token_use": "access"}),
            &key,
        )
        .unwrap()
    }

    fn verifies(material: &PublicKeyMaterial, token: &str) -> bool {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();
        decode::<Map<String, Value>>(token, material.decoding_key(), &validation).is_ok()
    }

    #[test]
    fn test_converted_key_verifies_matching_signature() {
        let material = convert_jwk(&jwk(TEST_KEY_1.n, TEST_KEY_1.e)).unwrap();
        let token = sign(TEST_KEY_1.private_key_pem);

        assert!(verifies(&material, &token));
    }

    #[test]
    fn test_converted_key_rejects_other_keys_signature() {
        let material = convert_jwk(&jwk(TEST_KEY_1.n, TEST_KEY_1.e)).unwrap();
        let token = sign(TEST_KEY_2.private_key_pem);

        assert!(!verifies(&material, &token));
    }

    #[test]
    fn test_reencoded_components_still_verify() {
        // bytes -> base64url -> bytes -> key must be lossless
        let modulus = URL_SAFE_NO_PAD.decode(TEST_KEY_2.n).unwrap();
        let exponent = URL_SAFE_NO_PAD.decode(TEST_KEY_2.e).unwrap();
        let reencoded = jwk(
            &URL_SAFE_NO_PAD.encode(&modulus),
            &URL_SAFE_NO_PAD.encode(&exponent),
        );

        let material = convert_jwk(&reencoded).unwrap();

        assert!(verifies(&material, &sign(TEST_KEY_2.private_key_pem)));
        assert_eq!(material.modulus_bits(), 2048);
        assert_eq!(material.exponent(), 65537);
    }

    #[test]
    fn test_invalid_modulus_names_modulus() {
        let err = convert_jwk(&jwk("!!!not-base64!!!", "AQAB")).unwrap_err();
        assert!(matches!(err, KeyConversionError::Modulus(_)), "got {:?}", err);
    }

    #[test]
    fn test_invalid_exponent_names_exponent() {
        let err = convert_jwk(&jwk(TEST_KEY_1.n, "A Q")).unwrap_err();
        assert!(matches!(err, KeyConversionError::Exponent(_)), "got {:?}", err);
    }

    #[test]
    fn test_padded_exponent_is_rejected() {
        let err = convert_jwk(&jwk(TEST_KEY_1.n, "AQAB=")).unwrap_err();
        assert!(matches!(err, KeyConversionError::Exponent(_)), "got {:?}", err);
    }

    #[test]
    fn test_exponent_wider_than_u64_is_rejected() {
        let wide = URL_SAFE_NO_PAD.encode([1u8; 9]);
        let err = convert_jwk(&jwk(TEST_KEY_1.n, &wide)).unwrap_err();
        assert_eq!(err, KeyConversionError::ExponentTooLarge { bytes: 9 });
    }

    #[test]
    fn test_exponent_leading_zeros_do_not_count_toward_width() {
        let mut bytes = vec![0u8; 12];
        bytes.extend_from_slice(&[0x01, 0x00, 0x01]);
        let material = convert_jwk(&jwk(TEST_KEY_1.n, &URL_SAFE_NO_PAD.encode(&bytes))).unwrap();
        assert_eq!(material.exponent(), 65537);
        assert!(verifies(&material, &sign(TEST_KEY_1.private_key_pem)));
    }

    #[test]
    fn test_debug_does_not_dump_key_bytes() {
        let material = convert_jwk(&jwk(TEST_KEY_1.n, TEST_KEY_1.e)).unwrap();
        let debug_str = format!("{:?}", material);

        assert!(debug_str.contains("modulus_bits: 2048"));
        assert!(!debug_str.contains(TEST_KEY_1.n));
    }
}
