use std::sync::atomic::{AtomicI64, Ordering};

use serde::{Deserialize, Serialize};

macro_rules! int_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash,
        )]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.parse::<i64>().map(Self)
            }
        }
    };
}

int_id!(
    /// Identity of a signed-in user; also the storage partition key.
    UserId
);
int_id!(
    /// Creation-time based document identifier.
    DocumentId
);
int_id!(CommentId);
int_id!(CategoryId);

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum Role {
    #[default]
    Member,
    Administrator,
}

/// The acting user.  Only `id` is authoritative; `name` is snapshotted into
/// documents and comments at creation time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl User {
    pub fn is_elevated(&self) -> bool {
        self.role == Role::Administrator
    }
}

/// Hands out creation-time ids (epoch milliseconds) that never repeat within
/// a process: two ids requested in the same millisecond differ by one.
#[derive(Debug, Default)]
pub struct IdGenerator {
    last: AtomicI64,
}

impl IdGenerator {
    pub const fn new() -> Self {
        Self {
            last: AtomicI64::new(0),
        }
    }

    pub fn next(&self) -> i64 {
        let now = chrono::Utc::now().timestamp_millis();
        let mut prev = self.last.load(Ordering::Relaxed);
        loop {
            let candidate = now.max(prev + 1);
            match self
                .last
                .compare_exchange_weak(prev, candidate, Ordering::AcqRel, Ordering::Relaxed)
            {
                Ok(_) => return candidate,
                Err(actual) => prev = actual,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_strictly_increase() {
        let ids = IdGenerator::new();
        let mut prev = ids.next();
        for _ in 0..1_000 {
            let id = ids.next();
            assert!(id > prev);
            prev = id;
        }
    }

    #[test]
    fn test_ids_are_epoch_millis() {
        let before = chrono::Utc::now().timestamp_millis();
        let id = IdGenerator::new().next();
        assert!(id >= before);
    }

    #[test]
    fn test_id_serializes_as_integer() {
        let json = serde_json::to_string(&DocumentId(1718000000000)).unwrap();
        assert_eq!(json, "1718000000000");
        let back: DocumentId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, DocumentId(1718000000000));
    }

    #[test]
    fn test_elevated_role() {
        let mut user = User {
            id: UserId(1),
            name: "Ada".into(),
            email: "ada@example.com".into(),
            role: Role::Member,
        };
        assert!(!user.is_elevated());
        user.role = Role::Administrator;
        assert!(user.is_elevated());
    }
}
