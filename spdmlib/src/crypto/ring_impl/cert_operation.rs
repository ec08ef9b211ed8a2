// Copyright (c) 2021 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

//! X.509 chain walking and validation backing `CryptoProvider::{cert_from_cert_chain,
//! verify_cert_chain}`, adapted from the teacher's `crypto::spdm_ring::cert_operation_impl`.

use crate::error::SpdmResult;
use crate::spdm_result_err;
use core::convert::TryFrom;
use ring::io::der;

pub fn get_cert_from_cert_chain(cert_chain: &[u8], index: isize) -> SpdmResult<(usize, usize)> {
    let mut offset = 0usize;
    let mut this_index = 0isize;
    loop {
        if cert_chain.len() < offset + 4 {
            return spdm_result_err!(InvalidRequest);
        }
        if cert_chain[offset] != 0x30 || cert_chain[offset + 1] != 0x82 {
            return spdm_result_err!(InvalidRequest);
        }
        let this_cert_len =
            ((cert_chain[offset + 2] as usize) << 8) + (cert_chain[offset + 3] as usize) + 4;
        if offset + this_cert_len > cert_chain.len() {
            return spdm_result_err!(InvalidRequest);
        }
        if this_index == index {
            return Ok((offset, offset + this_cert_len));
        }
        this_index += 1;
        if offset + this_cert_len == cert_chain.len() && index == -1 {
            return Ok((offset, offset + this_cert_len));
        }
        offset += this_cert_len;
        if offset == cert_chain.len() {
            return spdm_result_err!(InvalidRequest);
        }
    }
}

/// Walks a leaf certificate's DER to its `subjectPublicKeyInfo` BIT STRING
/// and returns the raw key bytes inside it (an uncompressed EC point for
/// ECDSA, a DER-encoded `RSAPublicKey` for RSA) — the form `ring::signature`
/// wants for `UnparsedPublicKey`. Hand-rolled rather than routed through
/// `webpki`, which parses a cert for chain validation but does not expose
/// its `subjectPublicKeyInfo` back out.
fn read_tlv(data: &[u8]) -> SpdmResult<(u8, &[u8], &[u8])> {
    if data.len() < 2 {
        return spdm_result_err!(InvalidRequest);
    }
    let tag = data[0];
    let (len, header_len) = if data[1] & 0x80 == 0 {
        (data[1] as usize, 2usize)
    } else {
        let n = (data[1] & 0x7f) as usize;
        if n == 0 || n > 4 || data.len() < 2 + n {
            return spdm_result_err!(InvalidRequest);
        }
        let mut len = 0usize;
        for b in &data[2..2 + n] {
            len = (len << 8) | (*b as usize);
        }
        (len, 2 + n)
    };
    if data.len() < header_len + len {
        return spdm_result_err!(InvalidRequest);
    }
    Ok((tag, &data[header_len..header_len + len], &data[header_len + len..]))
}

pub fn leaf_public_key(cert_der: &[u8]) -> SpdmResult<Vec<u8>> {
    const SEQUENCE: u8 = 0x30;
    const BIT_STRING: u8 = 0x03;
    const CONTEXT_0: u8 = 0xa0;

    let (tag, cert_body, _) = read_tlv(cert_der)?;
    if tag != SEQUENCE {
        return spdm_result_err!(InvalidRequest);
    }
    // Certificate ::= SEQUENCE { tbsCertificate, signatureAlgorithm, signatureValue }
    let (tag, mut tbs, _) = read_tlv(cert_body)?;
    if tag != SEQUENCE {
        return spdm_result_err!(InvalidRequest);
    }
    // TBSCertificate ::= SEQUENCE { version [0] OPTIONAL, serialNumber, signature,
    //   issuer, validity, subject, subjectPublicKeyInfo, ... }
    let (tag, _, rest) = read_tlv(tbs)?;
    if tag == CONTEXT_0 {
        tbs = rest;
    }
    // serialNumber, signature, issuer, validity, subject: skip five TLVs.
    for _ in 0..5 {
        let (_, _, rest) = read_tlv(tbs)?;
        tbs = rest;
    }
    let (tag, spki, _) = read_tlv(tbs)?;
    if tag != SEQUENCE {
        return spdm_result_err!(InvalidRequest);
    }
    // SubjectPublicKeyInfo ::= SEQUENCE { algorithm AlgorithmIdentifier, subjectPublicKey BIT STRING }
    let (tag, _, rest) = read_tlv(spki)?;
    if tag != SEQUENCE {
        return spdm_result_err!(InvalidRequest);
    }
    let (tag, bit_string, _) = read_tlv(rest)?;
    if tag != BIT_STRING || bit_string.is_empty() {
        return spdm_result_err!(InvalidRequest);
    }
    // First byte of a BIT STRING is the count of unused trailing bits.
    Ok(bit_string[1..].to_vec())
}

pub fn verify_cert_chain(cert_chain: &[u8]) -> SpdmResult<()> {
    static EKU_SPDM_RESPONDER_AUTH: &[u8] = &[40 + 3, 6, 1, 5, 5, 7, 3, 1];

    static ALL_SIGALGS: &[&webpki::SignatureAlgorithm] = &[
        &webpki::RSA_PKCS1_2048_8192_SHA256,
        &webpki::RSA_PKCS1_2048_8192_SHA384,
        &webpki::RSA_PKCS1_2048_8192_SHA512,
        &webpki::ECDSA_P256_SHA256,
        &webpki::ECDSA_P256_SHA384,
        &webpki::ECDSA_P384_SHA256,
        &webpki::ECDSA_P384_SHA384,
    ];

    let certs_der = untrusted::Input::from(cert_chain);
    let reader = &mut untrusted::Reader::new(certs_der);

    let mut certs = Vec::new();
    loop {
        let start = reader.mark();
        match der::expect_tag_and_get_value(reader, der::Tag::Sequence) {
            Ok(_) => {
                let end = reader.mark();
                let cert = reader
                    .get_input_between_marks(start, end)
                    .map_err(|_| crate::spdm_err!(InvalidRequest))?;
                certs.push(cert.as_slice_less_safe());
            }
            Err(_) => break,
        }
    }
    let certs_len = certs.len();

    let (ca, inters, ee): (&[u8], &[&[u8]], &[u8]) = match certs_len {
        0 => return spdm_result_err!(InvalidRequest),
        1 => (certs[0], &[], certs[0]),
        2 => (certs[0], &[], certs[1]),
        n => (certs[0], &certs[1..(n - 1)], certs[n - 1]),
    };

    let anchor = match webpki::TrustAnchor::try_from_cert_der(ca) {
        Ok(ta) => ta,
        Err(_) => return spdm_result_err!(SecurityViolation),
    };
    let anchors = vec![anchor];

    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_err(|_| crate::spdm_err!(InternalError))?
        .as_secs();
    let time = webpki::Time::from_seconds_since_unix_epoch(timestamp);

    let cert = match webpki::EndEntityCert::try_from(ee) {
        Ok(c) => c,
        Err(_) => return spdm_result_err!(SecurityViolation),
    };

    if cert
        .verify_cert_chain_with_eku(EKU_SPDM_RESPONDER_AUTH, ALL_SIGALGS, &anchors, inters, time, 0)
        .is_ok()
    {
        Ok(())
    } else {
        spdm_result_err!(SecurityViolation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::ring_impl::RingCryptoProvider;
    use crate::crypto::CryptoProvider;
    use crate::common::algo::{SpdmBaseAsymAlgo, SpdmBaseHashAlgo, SpdmSignatureStruct};
    use ring::signature::{EcdsaKeyPair, KeyPair};

    fn der_len(out: &mut Vec<u8>, len: usize) {
        if len < 0x80 {
            out.push(len as u8);
        } else {
            let bytes = len.to_be_bytes();
            let significant: Vec<u8> = bytes.iter().copied().skip_while(|b| *b == 0).collect();
            out.push(0x80 | significant.len() as u8);
            out.extend_from_slice(&significant);
        }
    }

    fn der_tlv(tag: u8, content: &[u8]) -> Vec<u8> {
        let mut out = vec![tag];
        der_len(&mut out, content.len());
        out.extend_from_slice(content);
        out
    }

    /// Builds a minimal, structurally-valid (but unsigned and untrusted)
    /// `Certificate` DER wrapping `spki_public_key` as the leaf's
    /// subjectPublicKeyInfo, exercising only `leaf_public_key`'s TLV walk.
    /// Padded past 255 bytes of outer content so the top-level SEQUENCE
    /// encodes its length the same way `get_cert_from_cert_chain` expects
    /// a real certificate to (a 2-byte long-form length, `0x30 0x82 ..`).
    fn synthetic_cert_der(spki_public_key: &[u8]) -> Vec<u8> {
        let empty_seq = der_tlv(0x30, &[]);
        let serial = der_tlv(0x02, &[0x01]);
        let padding = der_tlv(0x04, &[0u8; 220]);
        let bit_string = der_tlv(0x03, &[&[0x00], spki_public_key].concat());
        let spki = der_tlv(0x30, &[empty_seq.clone(), bit_string].concat());
        let tbs = der_tlv(
            0x30,
            &[serial, padding, empty_seq.clone(), empty_seq.clone(), empty_seq, spki].concat(),
        );
        let signature_value = der_tlv(0x03, &[0x00, 0x01, 0x02]);
        der_tlv(0x30, &[tbs, der_tlv(0x30, &[]), signature_value].concat())
    }

    #[test]
    fn test_leaf_public_key_extracts_spki_bit_string() {
        let pkcs8 = EcdsaKeyPair::generate_pkcs8(
            &ring::signature::ECDSA_P256_SHA256_FIXED_SIGNING,
            &ring::rand::SystemRandom::new(),
        )
        .unwrap();
        let key_pair =
            EcdsaKeyPair::from_pkcs8(&ring::signature::ECDSA_P256_SHA256_FIXED_SIGNING, pkcs8.as_ref()).unwrap();
        let raw_public_key = key_pair.public_key().as_ref().to_vec();

        let cert_der = synthetic_cert_der(&raw_public_key);
        let extracted = leaf_public_key(&cert_der).unwrap();
        assert_eq!(extracted, raw_public_key);
    }

    #[test]
    fn test_asym_sign_then_verify_round_trip_through_cert_der() {
        let pkcs8 = EcdsaKeyPair::generate_pkcs8(
            &ring::signature::ECDSA_P256_SHA256_FIXED_SIGNING,
            &ring::rand::SystemRandom::new(),
        )
        .unwrap();
        let key_pair =
            EcdsaKeyPair::from_pkcs8(&ring::signature::ECDSA_P256_SHA256_FIXED_SIGNING, pkcs8.as_ref()).unwrap();
        let raw_public_key = key_pair.public_key().as_ref().to_vec();
        let cert_der = synthetic_cert_der(&raw_public_key);

        let crypto = RingCryptoProvider::default();
        let message = b"transcript hash stand-in";
        let signature = crypto
            .asym_sign(
                SpdmBaseAsymAlgo::TPM_ALG_ECDSA_ECC_NIST_P256,
                SpdmBaseHashAlgo::TPM_ALG_SHA_256,
                pkcs8.as_ref(),
                message,
            )
            .unwrap();
        crypto
            .asym_verify(
                SpdmBaseAsymAlgo::TPM_ALG_ECDSA_ECC_NIST_P256,
                SpdmBaseHashAlgo::TPM_ALG_SHA_256,
                &cert_der,
                message,
                &signature,
            )
            .unwrap();

        let tampered = SpdmSignatureStruct::from_slice(&{
            let mut bytes = signature.as_ref().to_vec();
            bytes[0] ^= 0xff;
            bytes
        });
        assert!(crypto
            .asym_verify(
                SpdmBaseAsymAlgo::TPM_ALG_ECDSA_ECC_NIST_P256,
                SpdmBaseHashAlgo::TPM_ALG_SHA_256,
                &cert_der,
                message,
                &tampered,
            )
            .is_err());
    }
}
