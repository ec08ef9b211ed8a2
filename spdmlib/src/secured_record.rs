// Copyright (c) 2021 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

//! The secured message record layer (spec §4.6): wraps/unwraps one SPDM
//! message body in an AEAD record once a session has data secrets.
//!
//! ```text
//! AAD       = session_id(4B) || seq(N bytes) || length(2B)
//! Plaintext = app_data_length(2B) || payload || random(R bytes)
//! Nonce     = iv XOR seq            (seq placed in the low 8 bytes)
//! ```
//!
//! `N` (the sequence-number width on the wire) and `R` (the random-padding
//! cap) are both transport properties, not session properties, so they
//! come from `SpdmTransportEncap` rather than being baked in here.

use codec::{Codec, Reader};

use crate::common::SpdmTransportEncap;
use crate::error::SpdmResult;
use crate::spdm_result_err;
use crate::session::{SpdmSession, SpdmSessionDirection};

fn xor_iv_with_sequence_number(iv: &[u8], seq: u64) -> Vec<u8> {
    let mut nonce = iv.to_vec();
    let seq_bytes = seq.to_le_bytes();
    let len = nonce.len();
    for i in 0..seq_bytes.len().min(len) {
        nonce[len - 1 - i] ^= seq_bytes[i];
    }
    nonce
}

fn encode_sequence_number(seq: u64, width: u8) -> SpdmResult<Vec<u8>> {
    let width = width as usize;
    if width > 8 {
        return spdm_result_err!(InternalError);
    }
    let bytes = seq.to_le_bytes();
    if width < 8 && seq >> (width * 8) != 0 {
        return spdm_result_err!(InternalError);
    }
    Ok(bytes[..width].to_vec())
}

/// Encrypts `app_data` under the session's direction secret, returning a
/// complete secured-message record ready for transport framing.
pub fn encode_secured_message(
    session: &mut SpdmSession,
    direction: SpdmSessionDirection,
    transport_encap: &mut dyn SpdmTransportEncap,
    crypto: &dyn crate::crypto::CryptoProvider,
    app_data: &[u8],
    random: &[u8],
) -> SpdmResult<Vec<u8>> {
    let seq_width = transport_encap.get_sequence_number_count();
    let seq = session.next_sequence_number(direction)?;
    let seq_bytes = encode_sequence_number(seq, seq_width)?;

    let mut plain = Vec::with_capacity(2 + app_data.len() + random.len());
    plain.extend_from_slice(&(app_data.len() as u16).to_le_bytes());
    plain.extend_from_slice(app_data);
    plain.extend_from_slice(random);

    let cipher_len = (plain.len() + 16) as u16; // + AEAD tag
    let mut aad = Vec::with_capacity(4 + seq_bytes.len() + 2);
    aad.extend_from_slice(&session.session_id.to_le_bytes());
    aad.extend_from_slice(&seq_bytes);
    aad.extend_from_slice(&cipher_len.to_le_bytes());

    let (key, iv) = session.aead_key_iv(direction);
    let nonce = xor_iv_with_sequence_number(iv, seq);
    let cipher_text = crypto.aead_encrypt(session.aead_algo(), key, &nonce, &aad, &plain)?;

    let mut record = Vec::with_capacity(aad.len() + cipher_text.len());
    record.extend_from_slice(&aad);
    record.extend_from_slice(&cipher_text);
    Ok(record)
}

fn app_data_from_plaintext(plain: &[u8]) -> SpdmResult<Vec<u8>> {
    if plain.len() < 2 {
        return spdm_result_err!(DecryptError);
    }
    let app_data_length = u16::from_le_bytes([plain[0], plain[1]]) as usize;
    if plain.len() < 2 + app_data_length {
        return spdm_result_err!(DecryptError);
    }
    Ok(plain[2..2 + app_data_length].to_vec())
}

/// Reverses `encode_secured_message`, checking the AEAD tag and the
/// recovered `app_data_length` before returning the application payload.
/// A tag mismatch always surfaces as `SpdmStatus::DecryptError`.
///
/// KEY_UPDATE opens a crossover window (spec §4.6/§4.8 point 4) where the
/// peer may already be sending under a secret this side has only staged as
/// pending via `start_key_update`. If the wire sequence number doesn't match
/// the current secret's count, this retries once against the pending
/// secret's derived key/IV (which starts its own sequence count at zero)
/// before giving up. The retry never commits the pending secret as current
/// — that only happens on an explicit `VERIFY_NEW_KEY`/`activate_pending_keys`.
pub fn decode_secured_message(
    session: &mut SpdmSession,
    direction: SpdmSessionDirection,
    transport_encap: &mut dyn SpdmTransportEncap,
    crypto: &dyn crate::crypto::CryptoProvider,
    record: &[u8],
) -> SpdmResult<Vec<u8>> {
    let seq_width = transport_encap.get_sequence_number_count() as usize;
    if record.len() < 4 + seq_width + 2 {
        return spdm_result_err!(InvalidRequest);
    }
    let aad = &record[..4 + seq_width + 2];
    let cipher_text = &record[4 + seq_width + 2..];

    let mut r = Reader::init(&aad[..4]);
    let session_id = u32::read(&mut r).ok_or_else(|| crate::spdm_err!(InvalidRequest))?;
    if session_id != session.session_id {
        return spdm_result_err!(InvalidRequest);
    }
    let mut seq_bytes = [0u8; 8];
    seq_bytes[..seq_width].copy_from_slice(&aad[4..4 + seq_width]);
    let seq = u64::from_le_bytes(seq_bytes);

    let current_matches = seq == session.peek_sequence_number(direction);
    let mut current_err = None;
    if current_matches {
        let (key, iv) = session.aead_key_iv(direction);
        let nonce = xor_iv_with_sequence_number(iv, seq);
        match crypto.aead_decrypt(session.aead_algo(), key, &nonce, aad, cipher_text) {
            Ok(plain) => {
                session.next_sequence_number(direction)?;
                return app_data_from_plaintext(&plain);
            }
            Err(e) => current_err = Some(e),
        }
    }

    if session.peek_pending_sequence_number(direction) == Some(seq) {
        if let Some((key, iv)) = session.pending_aead_key_iv(direction, crypto)? {
            let nonce = xor_iv_with_sequence_number(&iv, seq);
            if let Ok(plain) = crypto.aead_decrypt(session.aead_algo(), &key, &nonce, aad, cipher_text) {
                session.advance_pending_sequence_number(direction)?;
                return app_data_from_plaintext(&plain);
            }
        }
    }

    match current_err {
        Some(e) => Err(e),
        None => spdm_result_err!(SecurityViolation),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::algo::{SpdmAeadAlgo, SpdmBaseHashAlgo};
    use crate::crypto::ring_impl::RingCryptoProvider;
    use crate::testlib::PassthroughTransportEncap;

    fn established_session() -> SpdmSession {
        let crypto = RingCryptoProvider::default();
        let mut session = SpdmSession::new(0x01, false, SpdmBaseHashAlgo::TPM_ALG_SHA_256, SpdmAeadAlgo::AES_128_GCM);
        session.generate_handshake_secret(&crypto, vec![0x42u8; 32], b"th1").unwrap();
        session.generate_data_secret(&crypto, b"th2").unwrap();
        session
    }

    #[test]
    fn test_case0_round_trip_under_current_key() {
        let crypto = RingCryptoProvider::default();
        let mut sender = established_session();
        let mut receiver = established_session();
        let mut encap = PassthroughTransportEncap::default();

        let record =
            encode_secured_message(&mut sender, SpdmSessionDirection::Request, &mut encap, &crypto, b"PING", &[]).unwrap();
        let plain =
            decode_secured_message(&mut receiver, SpdmSessionDirection::Request, &mut encap, &crypto, &record).unwrap();
        assert_eq!(plain, b"PING");
    }

    #[test]
    fn test_case1_decode_retries_pending_key_during_key_update_crossover() {
        let crypto = RingCryptoProvider::default();
        let mut sender = established_session();
        let mut receiver = established_session();
        let mut encap = PassthroughTransportEncap::default();

        // Sender has already rolled and activated its own request-direction
        // secret, as it does right after a KEY_UPDATE ACK; the receiver has
        // only staged the matching roll as pending.
        sender.start_key_update(&crypto, false).unwrap();
        sender.activate_pending_keys(&crypto).unwrap();
        receiver.start_key_update(&crypto, false).unwrap();

        let record =
            encode_secured_message(&mut sender, SpdmSessionDirection::Request, &mut encap, &crypto, b"PING", &[]).unwrap();
        let plain =
            decode_secured_message(&mut receiver, SpdmSessionDirection::Request, &mut encap, &crypto, &record).unwrap();
        assert_eq!(plain, b"PING");
        assert!(
            receiver.has_pending_key_update(),
            "the crossover retry must not itself activate the pending secret"
        );
    }

    #[test]
    fn test_case2_decode_rejects_record_under_a_key_neither_side_has() {
        let crypto = RingCryptoProvider::default();
        let mut sender = established_session();
        let mut receiver = established_session();
        let mut encap = PassthroughTransportEncap::default();

        sender.start_key_update(&crypto, false).unwrap();
        sender.activate_pending_keys(&crypto).unwrap();

        let record =
            encode_secured_message(&mut sender, SpdmSessionDirection::Request, &mut encap, &crypto, b"PING", &[]).unwrap();
        let result = decode_secured_message(&mut receiver, SpdmSessionDirection::Request, &mut encap, &crypto, &record);
        assert!(result.is_err());
    }
}
