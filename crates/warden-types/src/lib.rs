//! Core types for Warden.
//!
//! This crate provides the identifier and identity primitives shared by
//! every other Warden crate.
//!
//! # Crate Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        SDK Layer                            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  warden-types   : ids, Identity, ErrorCode      ◄── HERE    │
//! │  warden-auth    : Agent, Role, Constraint, Token, Subject   │
//! │  warden-command : Command, CommandChain, CommandTarget      │
//! └─────────────────────────────────────────────────────────────┘
//!                               ↓
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Runtime Layer                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  warden-runtime : ClassRegistry, Delegate, Transaction      │
//! └─────────────────────────────────────────────────────────────┘
//!                               ↓
//! ┌─────────────────────────────────────────────────────────────┐
//! │  warden-cli     : `warden` binary                           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Articles
//!
//! Anything with an access-control identity is an *article*. Articles are
//! identified by an [`ArticleId`]: a UUID or a reserved [`Keyword`]. Typed
//! wrappers keep subject, resource and constraint identifiers apart:
//!
//! ```
//! use warden_types::{ConstraintId, ResourceId, SubjectId};
//!
//! let write = ConstraintId::from("write");
//! let doc = ResourceId::from("doc1");
//! let alice = SubjectId::random();
//!
//! assert_eq!(write.to_string(), "constraint:write");
//! assert_eq!(doc, ResourceId::from("doc1"));
//! assert_ne!(alice, SubjectId::random());
//! ```

mod construct;
mod error;
mod id;
mod identity;
mod keyword;

pub use construct::TryNew;
pub use error::{assert_error_code, assert_error_codes, ErrorCode};
pub use id::{
    ArticleId, CommandId, ConstraintId, RequestId, ResourceId, SubjectId, TargetId, TransactionId,
};
pub use identity::{Identity, IdentityStyle};
pub use keyword::{Keyword, KeywordError, MAX_KEYWORD_LEN};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_ids_are_deterministic() {
        let a = CommandId::derived("warden.command.version");
        let b = CommandId::derived("warden.command.version");
        let c = CommandId::derived("warden.command.log");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn random_ids_are_unique() {
        assert_ne!(TransactionId::random(), TransactionId::random());
        assert_ne!(RequestId::random(), RequestId::random());
    }

    #[test]
    fn parse_prefers_uuid_then_keyword() {
        let uuid = uuid::Uuid::new_v4();
        let parsed = ArticleId::from(uuid.to_string());
        assert_eq!(parsed.as_uuid(), Some(uuid));

        let kw = ArticleId::from("execute");
        assert!(kw.is_keyword());
        assert_eq!(kw.as_uuid(), None);

        let path = ArticleId::from("/reports/2024");
        assert!(!path.is_keyword());
        assert_eq!(path, ArticleId::derived("/reports/2024"));
    }

    #[test]
    fn typed_display_carries_prefix() {
        assert_eq!(SubjectId::from("system").to_string(), "subject:system");
        assert_eq!(ResourceId::from("doc1").to_string(), "resource:doc1");
        assert!(TargetId::derived("x").to_string().starts_with("target:"));
    }

    #[test]
    fn keyword_constructor_validates() {
        assert!(ConstraintId::keyword("read").is_ok());
        assert!(ConstraintId::keyword("Read Only").is_err());
    }

    #[test]
    fn serde_roundtrip_keeps_variant() {
        let kw = SubjectId::from("system");
        let json = serde_json::to_string(&kw).expect("serialize keyword id");
        assert_eq!(json, "\"system\"");
        let back: SubjectId = serde_json::from_str(&json).expect("deserialize keyword id");
        assert_eq!(back, kw);

        let random = SubjectId::random();
        let json = serde_json::to_string(&random).expect("serialize uuid id");
        let back: SubjectId = serde_json::from_str(&json).expect("deserialize uuid id");
        assert_eq!(back, random);
    }

    #[test]
    fn identity_styles() {
        let fixed: Identity<CommandId> = Identity::fixed("warden.command.version");
        assert!(fixed.is_static());
        assert_eq!(fixed.id(), &CommandId::derived("warden.command.version"));
        assert_eq!(fixed.name(), "warden.command.version");

        let dynamic: Identity<TransactionId> = Identity::dynamic("resource");
        assert_eq!(dynamic.style(), IdentityStyle::Dynamic);
    }
}
