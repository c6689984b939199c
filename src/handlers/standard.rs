//! Standard security handler: per-document session state and the hooks
//! the document writer calls while emitting objects, the encryption
//! dictionary, and the trailer.

use log::{debug, trace};
use rand::{thread_rng, RngCore};

use super::ObjectWriter;
use crate::crypto::{rc4_process, Rc4KeyCache};
use crate::error::{ProtectionError, ProtectionResult};
use crate::pdf::{
    bytes_to_hex, escape_literal, hex_to_bytes, text_string_bytes, unescape_literal, ContentToken,
};
use crate::security::{self, derive_document_keys, DocumentKeys};
use crate::Permissions;

/// Encryption dictionary constants for the 40-bit RC4 scheme.
const VERSION: u8 = 1;
const REVISION: u8 = 2;

/// Protection session for one document build.
///
/// Created disabled. [`set_protection`](Self::set_protection) derives the
/// document keys and enables every subsequent hook; from then on the
/// derived values are immutable. All state is single-owner and dies with
/// the document builder.
#[derive(Default)]
pub struct StandardSecurityHandler {
    encrypted: bool,
    keys: Option<DocumentKeys>,
    encryption_object_id: Option<u32>,
    rc4_cache: Rc4KeyCache,
}

impl StandardSecurityHandler {
    /// Create a new, disabled session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether content hooks currently transform their input.
    pub fn is_encrypted(&self) -> bool {
        self.encrypted
    }

    /// Set permissions and passwords, derive the document keys, and
    /// enable encryption.
    ///
    /// Returns the owner password in effect: the supplied one, or a
    /// generated value the caller must persist if owner unlock is wanted
    /// later. Unknown permission bits are ignored.
    pub fn set_protection(
        &mut self,
        permissions: Permissions,
        user_password: &str,
        owner_password: Option<&str>,
    ) -> ProtectionResult<String> {
        if self.keys.is_some() {
            return Err(ProtectionError::AlreadyConfigured);
        }

        let owner_password = match owner_password {
            Some(password) => password.to_string(),
            None => generate_owner_password(user_password),
        };

        let keys = derive_document_keys(
            &mut self.rc4_cache,
            user_password.as_bytes(),
            owner_password.as_bytes(),
            permissions.protection_byte(),
        )?;

        self.keys = Some(keys);
        self.encrypted = true;
        debug!("protection enabled, permissions {:#04x}", permissions.bits());

        Ok(owner_password)
    }

    /// O entry of the encryption dictionary, once derived.
    pub fn o_value(&self) -> Option<&[u8; 32]> {
        self.keys.as_ref().map(|keys| &keys.o_value)
    }

    /// U entry of the encryption dictionary, once derived.
    pub fn u_value(&self) -> Option<&[u8; 32]> {
        self.keys.as_ref().map(|keys| &keys.u_value)
    }

    /// P entry of the encryption dictionary, once derived.
    pub fn p_value(&self) -> Option<i32> {
        self.keys.as_ref().map(|keys| keys.p_value)
    }

    /// Id of the emitted encryption dictionary object, once written.
    pub fn encryption_object_id(&self) -> Option<u32> {
        self.encryption_object_id
    }

    /// RC4 key for the object currently being written. Derived on every
    /// call; the same id always yields the same key.
    pub fn object_key(&self, object_id: u32) -> ProtectionResult<[u8; 10]> {
        let keys = self.keys.as_ref().ok_or(ProtectionError::NotConfigured)?;
        Ok(security::object_key(&keys.encryption_key, object_id))
    }

    /// Serialize a freshly authored text string as a complete literal
    /// token, encrypting the payload when protection is enabled.
    ///
    /// Non-ASCII text is converted to UTF-16BE with a byte-order mark
    /// before encryption.
    pub fn text_string(&mut self, object_id: u32, text: &str) -> ProtectionResult<Vec<u8>> {
        let mut bytes = text_string_bytes(text);
        if self.encrypted {
            bytes = self.encrypt_for_object(object_id, &bytes)?;
        }

        let mut token = Vec::with_capacity(bytes.len() + 2);
        token.push(b'(');
        token.extend_from_slice(&escape_literal(&bytes));
        token.push(b')');
        Ok(token)
    }

    /// Transform a stream body written for `object_id`. No escaping is
    /// involved; disabled sessions pass the body through unchanged.
    pub fn transform_stream(&mut self, object_id: u32, data: &[u8]) -> ProtectionResult<Vec<u8>> {
        if !self.encrypted {
            return Ok(data.to_vec());
        }
        self.encrypt_for_object(object_id, data)
    }

    /// Re-serialize a token parsed from a source document, encrypting the
    /// payload under `object_id`'s key. Wire form in, wire form out:
    /// literal payloads are unescaped and re-escaped, hex payloads
    /// decoded and re-encoded, stream bodies transformed directly.
    pub fn transform_token(
        &mut self,
        object_id: u32,
        token: ContentToken,
    ) -> ProtectionResult<ContentToken> {
        if !self.encrypted {
            return Ok(token);
        }

        match token {
            ContentToken::Literal(escaped) => {
                let raw = unescape_literal(&escaped);
                let encrypted = self.encrypt_for_object(object_id, &raw)?;
                Ok(ContentToken::Literal(escape_literal(&encrypted)))
            }
            ContentToken::Hex(digits) => {
                let raw = hex_to_bytes(&digits)?;
                let encrypted = self.encrypt_for_object(object_id, &raw)?;
                Ok(ContentToken::Hex(bytes_to_hex(&encrypted)))
            }
            ContentToken::Stream(body) => {
                let encrypted = self.encrypt_for_object(object_id, &body)?;
                Ok(ContentToken::Stream(encrypted))
            }
        }
    }

    /// Allocate and emit the encryption dictionary object. The writer
    /// calls this once, after all page and resource objects are written.
    pub fn write_encryption_object<W: ObjectWriter>(
        &mut self,
        writer: &mut W,
    ) -> ProtectionResult<u32> {
        let keys = self.keys.as_ref().ok_or(ProtectionError::NotConfigured)?;

        let id = writer.allocate_object();
        let mut body = Vec::with_capacity(128);
        body.extend_from_slice(format!("{} 0 obj\n", id).as_bytes());
        body.extend_from_slice(
            format!("<<\n/Filter /Standard\n/V {}\n/R {}\n", VERSION, REVISION).as_bytes(),
        );
        body.extend_from_slice(b"/O (");
        body.extend_from_slice(&escape_literal(&keys.o_value));
        body.extend_from_slice(b")\n/U (");
        body.extend_from_slice(&escape_literal(&keys.u_value));
        body.extend_from_slice(b")\n");
        body.extend_from_slice(format!("/P {}\n", keys.p_value).as_bytes());
        body.extend_from_slice(b">>\nendobj\n");
        writer.emit_raw(&body);

        self.encryption_object_id = Some(id);
        debug!("encryption dictionary emitted as object {}", id);
        Ok(id)
    }

    /// Emit the trailer's /Encrypt reference and the empty /ID array.
    ///
    /// The /ID halves are empty strings: revision-2 U derivation in this
    /// handler does not mix in a file identifier.
    pub fn write_trailer_entries<W: ObjectWriter>(&self, writer: &mut W) -> ProtectionResult<()> {
        if !self.encrypted {
            return Err(ProtectionError::NotConfigured);
        }
        let id = self
            .encryption_object_id
            .ok_or(ProtectionError::MissingEncryptionObject)?;

        writer.emit_raw(format!("/Encrypt {} 0 R\n", id).as_bytes());
        writer.emit_raw(b"/ID [()()]\n");
        Ok(())
    }

    fn encrypt_for_object(&mut self, object_id: u32, data: &[u8]) -> ProtectionResult<Vec<u8>> {
        let keys = self.keys.as_ref().ok_or(ProtectionError::NotConfigured)?;
        let key = security::object_key(&keys.encryption_key, object_id);
        trace!("transforming {} bytes for object {}", data.len(), object_id);
        rc4_process(&mut self.rc4_cache, &key, data)
    }
}

/// Generate an owner password when the caller supplies none.
///
/// Uniqueness, not cryptographic strength, is the requirement here: the
/// value only has to differ from the user password and resist trivial
/// guessing. The caller receives it for persistence.
fn generate_owner_password(user_password: &str) -> String {
    let mut rng = thread_rng();
    loop {
        let mut raw = [0u8; 12];
        rng.fill_bytes(&mut raw);
        let candidate = hex::encode(raw);
        if candidate != user_password {
            return candidate;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn protected() -> StandardSecurityHandler {
        let mut handler = StandardSecurityHandler::new();
        handler
            .set_protection(Permissions::new(Permissions::ALL), "user", Some("owner"))
            .unwrap();
        handler
    }

    #[test]
    fn test_session_starts_disabled() {
        let handler = StandardSecurityHandler::new();
        assert!(!handler.is_encrypted());
        assert!(handler.o_value().is_none());
        assert!(matches!(
            handler.object_key(1),
            Err(ProtectionError::NotConfigured)
        ));
    }

    #[test]
    fn test_set_protection_twice_fails() {
        let mut handler = protected();
        let result = handler.set_protection(Permissions::new(0), "", None);
        assert!(matches!(result, Err(ProtectionError::AlreadyConfigured)));
    }

    #[test]
    fn test_supplied_owner_password_is_echoed() {
        let mut handler = StandardSecurityHandler::new();
        let used = handler
            .set_protection(Permissions::new(Permissions::PRINT), "u", Some("owner-secret"))
            .unwrap();
        assert_eq!(used, "owner-secret");
    }

    #[test]
    fn test_generated_owner_passwords_do_not_repeat() {
        let mut first = StandardSecurityHandler::new();
        let mut second = StandardSecurityHandler::new();
        let a = first.set_protection(Permissions::new(0), "", None).unwrap();
        let b = second.set_protection(Permissions::new(0), "", None).unwrap();
        assert_ne!(a, b);
        assert_ne!(a, "");
    }

    #[test]
    fn test_same_owner_password_gives_same_o_value() {
        let a = protected();
        let b = protected();
        assert_eq!(a.o_value().unwrap(), b.o_value().unwrap());
        assert_eq!(a.u_value().unwrap(), b.u_value().unwrap());
        assert_eq!(a.p_value(), b.p_value());
    }

    #[test]
    fn test_full_permissions_p_value() {
        assert_eq!(protected().p_value(), Some(-4));
    }

    #[test]
    fn test_text_string_plain_when_disabled() {
        let mut handler = StandardSecurityHandler::new();
        assert_eq!(handler.text_string(1, "a(b)").unwrap(), b"(a\\(b\\))".to_vec());
    }

    #[test]
    fn test_text_string_encrypts_when_enabled() {
        let mut handler = protected();
        let token = handler.text_string(5, "Hello").unwrap();

        assert_eq!(token[0], b'(');
        assert_eq!(*token.last().unwrap(), b')');

        // payload must be the object-5 RC4 transform of the ASCII bytes
        let key = handler.object_key(5).unwrap();
        let expected =
            rc4_process(&mut Rc4KeyCache::new(), &key, b"Hello").unwrap();
        assert_eq!(token[1..token.len() - 1], escape_literal(&expected)[..]);
    }

    #[test]
    fn test_text_string_converts_to_utf16_before_encryption() {
        let mut handler = protected();
        let token = handler.text_string(6, "f\u{00FC}r").unwrap();

        let key = handler.object_key(6).unwrap();
        let expected = rc4_process(
            &mut Rc4KeyCache::new(),
            &key,
            &text_string_bytes("f\u{00FC}r"),
        )
        .unwrap();
        assert_eq!(token[1..token.len() - 1], escape_literal(&expected)[..]);
    }

    #[test]
    fn test_stream_transform_round_trip() {
        let mut handler = protected();
        let body = b"BT /F1 12 Tf (hi) Tj ET".to_vec();

        let encrypted = handler.transform_stream(3, &body).unwrap();
        assert_ne!(encrypted, body);

        // symmetric: transforming again under the same object restores it
        let restored = handler.transform_stream(3, &encrypted).unwrap();
        assert_eq!(restored, body);
    }

    #[test]
    fn test_transform_token_identity_when_disabled() {
        let mut handler = StandardSecurityHandler::new();
        let token = ContentToken::Literal(b"kept \\(as is\\)".to_vec());
        assert_eq!(handler.transform_token(9, token.clone()).unwrap(), token);
    }

    #[test]
    fn test_transform_token_literal_round_trip() {
        let mut handler = protected();
        let original = ContentToken::Literal(escape_literal(b"raw (bytes) \\ here"));

        let encrypted = handler.transform_token(2, original.clone()).unwrap();
        assert_ne!(encrypted, original);

        let restored = handler.transform_token(2, encrypted).unwrap();
        assert_eq!(restored, original);
    }

    #[test]
    fn test_transform_token_hex_round_trip() {
        let mut handler = protected();
        let original = ContentToken::Hex(b"48656c6c6f".to_vec());

        let encrypted = handler.transform_token(2, original.clone()).unwrap();
        let restored = handler.transform_token(2, encrypted).unwrap();
        assert_eq!(restored, original);
    }

    #[test]
    fn test_hex_token_payload_matches_stream_cipher() {
        // same raw bytes, same object: hex and stream paths share the key
        let mut handler = protected();

        let hex_token = handler
            .transform_token(4, ContentToken::Hex(b"0102030405".to_vec()))
            .unwrap();
        let stream = handler
            .transform_stream(4, &[0x01, 0x02, 0x03, 0x04, 0x05])
            .unwrap();

        match hex_token {
            ContentToken::Hex(digits) => {
                assert_eq!(digits, bytes_to_hex(&stream));
            }
            other => panic!("unexpected token variant: {:?}", other),
        }
    }
}
