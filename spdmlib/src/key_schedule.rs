// Copyright (c) 2021 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

//! The HKDF label schedule (spec §4.5) that turns a DHE or PSK secret plus
//! the transcript hashes captured at TH1/TH2 into the four AEAD key/IV pairs
//! and two finished keys a session needs. Every derivation bottoms out in
//! `CryptoProvider::{hkdf_extract,hkdf_expand}` so a host's crypto backend
//! never has to know the label schedule itself.

use crate::common::algo::SpdmBaseHashAlgo;
use crate::crypto::CryptoProvider;
use crate::error::SpdmResult;

const SPDM_VERSION_LABEL: &[u8] = b"spdm1.1 ";

/// Builds the `HKDF-Expand-Label` info string the schedule uses at every
/// step: `length(2) || label_len(1) || "spdm1.1 " || label || context_len(1) || context`.
fn expand_label_info(label: &str, context: &[u8], out_len: u16) -> Vec<u8> {
    let full_label = [SPDM_VERSION_LABEL, label.as_bytes()].concat();
    let mut info = Vec::with_capacity(2 + 1 + full_label.len() + 1 + context.len());
    info.extend_from_slice(&out_len.to_be_bytes());
    info.push(full_label.len() as u8);
    info.extend_from_slice(&full_label);
    info.push(context.len() as u8);
    info.extend_from_slice(context);
    info
}

fn hkdf_expand_label(
    crypto: &dyn CryptoProvider,
    hash_algo: SpdmBaseHashAlgo,
    secret: &[u8],
    label: &str,
    context: &[u8],
    out_len: u16,
) -> SpdmResult<Vec<u8>> {
    let info = expand_label_info(label, context, out_len);
    crypto.hkdf_expand(hash_algo, secret, &info, out_len as usize)
}

/// `HKDF-Extract(0, dhe_secret)`, the non-PSK handshake secret root.
pub fn derive_handshake_secret(
    crypto: &dyn CryptoProvider,
    hash_algo: SpdmBaseHashAlgo,
    dhe_secret: &[u8],
) -> SpdmResult<Vec<u8>> {
    let zero_salt = vec![0u8; hash_algo.get_size() as usize];
    Ok(crypto.hkdf_extract(hash_algo, &zero_salt, dhe_secret)?.as_ref().to_vec())
}

/// `HKDF-Extract(0, psk)`, the PSK handshake secret root.
pub fn derive_handshake_secret_psk(
    crypto: &dyn CryptoProvider,
    hash_algo: SpdmBaseHashAlgo,
    psk: &[u8],
) -> SpdmResult<Vec<u8>> {
    derive_handshake_secret(crypto, hash_algo, psk)
}

/// Splits the handshake secret into the per-direction secrets bound to TH1
/// (the transcript through KEY_EXCHANGE/PSK_EXCHANGE and its response).
pub fn derive_session_handshake_secrets(
    crypto: &dyn CryptoProvider,
    hash_algo: SpdmBaseHashAlgo,
    handshake_secret: &[u8],
    th1_hash: &[u8],
) -> SpdmResult<(Vec<u8>, Vec<u8>)> {
    let hash_len = hash_algo.get_size();
    let request_handshake_secret =
        hkdf_expand_label(crypto, hash_algo, handshake_secret, "req hs data", th1_hash, hash_len)?;
    let response_handshake_secret =
        hkdf_expand_label(crypto, hash_algo, handshake_secret, "rsp hs data", th1_hash, hash_len)?;
    Ok((request_handshake_secret, response_handshake_secret))
}

/// The master secret chained off the handshake secret (spec §4.5: "derived"
/// step, mirroring the zero-IKM re-extract TLS 1.3 uses between phases).
pub fn derive_master_secret(
    crypto: &dyn CryptoProvider,
    hash_algo: SpdmBaseHashAlgo,
    handshake_secret: &[u8],
) -> SpdmResult<Vec<u8>> {
    let hash_len = hash_algo.get_size();
    let empty_hash = crypto.hash_all(hash_algo, &[])?;
    let salt = hkdf_expand_label(
        crypto,
        hash_algo,
        handshake_secret,
        "derived",
        empty_hash.as_ref(),
        hash_len,
    )?;
    let zero_ikm = vec![0u8; hash_len as usize];
    Ok(crypto.hkdf_extract(hash_algo, &salt, &zero_ikm)?.as_ref().to_vec())
}

/// Splits the master secret into the per-direction data secrets bound to
/// TH2 (the transcript through FINISH/PSK_FINISH and its response).
pub fn derive_session_data_secrets(
    crypto: &dyn CryptoProvider,
    hash_algo: SpdmBaseHashAlgo,
    master_secret: &[u8],
    th2_hash: &[u8],
) -> SpdmResult<(Vec<u8>, Vec<u8>)> {
    let hash_len = hash_algo.get_size();
    let request_data_secret =
        hkdf_expand_label(crypto, hash_algo, master_secret, "req app data", th2_hash, hash_len)?;
    let response_data_secret =
        hkdf_expand_label(crypto, hash_algo, master_secret, "rsp app data", th2_hash, hash_len)?;
    Ok((request_data_secret, response_data_secret))
}

/// The HMAC key a FINISH/PSK_FINISH verify-data field is checked against.
pub fn derive_finished_key(
    crypto: &dyn CryptoProvider,
    hash_algo: SpdmBaseHashAlgo,
    direction_secret: &[u8],
) -> SpdmResult<Vec<u8>> {
    let hash_len = hash_algo.get_size();
    hkdf_expand_label(crypto, hash_algo, direction_secret, "finished", &[], hash_len)
}

/// The AEAD key and IV a running secret expands to (spec §4.6).
pub fn derive_aead_key_iv(
    crypto: &dyn CryptoProvider,
    hash_algo: SpdmBaseHashAlgo,
    direction_secret: &[u8],
    key_len: u16,
    iv_len: u16,
) -> SpdmResult<(Vec<u8>, Vec<u8>)> {
    let key = hkdf_expand_label(crypto, hash_algo, direction_secret, "key", &[], key_len)?;
    let iv = hkdf_expand_label(crypto, hash_algo, direction_secret, "iv", &[], iv_len)?;
    Ok((key, iv))
}

/// Rolls a direction secret forward one KEY_UPDATE generation (spec §4.6.1:
/// `traffic_secret_N+1 = HKDF-Expand-Label(traffic_secret_N, "key update", "", Hash.length)`).
pub fn update_secret(
    crypto: &dyn CryptoProvider,
    hash_algo: SpdmBaseHashAlgo,
    current_secret: &[u8],
) -> SpdmResult<Vec<u8>> {
    let hash_len = hash_algo.get_size();
    hkdf_expand_label(crypto, hash_algo, current_secret, "key update", &[], hash_len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::ring_impl::RingCryptoProvider;

    #[test]
    fn test_schedule_is_deterministic() {
        let crypto = RingCryptoProvider::default();
        let hash_algo = SpdmBaseHashAlgo::TPM_ALG_SHA_384;
        let dhe_secret = [0x42u8; 48];

        let hs1 = derive_handshake_secret(&crypto, hash_algo, &dhe_secret).unwrap();
        let hs2 = derive_handshake_secret(&crypto, hash_algo, &dhe_secret).unwrap();
        assert_eq!(hs1, hs2);

        let th1 = crypto.hash_all(hash_algo, b"th1").unwrap();
        let (req1, rsp1) = derive_session_handshake_secrets(&crypto, hash_algo, &hs1, th1.as_ref()).unwrap();
        let (req2, rsp2) = derive_session_handshake_secrets(&crypto, hash_algo, &hs2, th1.as_ref()).unwrap();
        assert_eq!(req1, req2);
        assert_eq!(rsp1, rsp2);
        assert_ne!(req1, rsp1);
    }

    #[test]
    fn test_key_update_changes_secret_and_is_one_way() {
        let crypto = RingCryptoProvider::default();
        let hash_algo = SpdmBaseHashAlgo::TPM_ALG_SHA_256;
        let secret = vec![0x11u8; 32];
        let updated = update_secret(&crypto, hash_algo, &secret).unwrap();
        assert_ne!(secret, updated);
        let updated_again = update_secret(&crypto, hash_algo, &updated).unwrap();
        assert_ne!(updated, updated_again);
    }
}
