//! Typed cache payload
//!
//! The sum of every resource shape the service caches.

use crate::fetch::CacheValue;
use crate::models::{Post, User};

#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Users(Vec<User>),
    User(User),
    Posts(Vec<Post>),
    Post(Post),
}

impl CacheValue<Payload> for Vec<User> {
    fn into_value(self) -> Payload {
        Payload::Users(self)
    }

    fn from_value(value: &Payload) -> Option<Self> {
        match value {
            Payload::Users(users) => Some(users.clone()),
            _ => None,
        }
    }
}

impl CacheValue<Payload> for User {
    fn into_value(self) -> Payload {
        Payload::User(self)
    }

    fn from_value(value: &Payload) -> Option<Self> {
        match value {
            Payload::User(user) => Some(user.clone()),
            _ => None,
        }
    }
}

impl CacheValue<Payload> for Vec<Post> {
    fn into_value(self) -> Payload {
        Payload::Posts(self)
    }

    fn from_value(value: &Payload) -> Option<Self> {
        match value {
            Payload::Posts(posts) => Some(posts.clone()),
            _ => None,
        }
    }
}

impl CacheValue<Payload> for Post {
    fn into_value(self) -> Payload {
        Payload::Post(self)
    }

    fn from_value(value: &Payload) -> Option<Self> {
        match value {
            Payload::Post(post) => Some(post.clone()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mismatched_shape_is_none() {
        let payload = Payload::Users(Vec::new());
        assert!(<Vec<Post> as CacheValue<Payload>>::from_value(&payload).is_none());
        assert_eq!(
            <Vec<User> as CacheValue<Payload>>::from_value(&payload),
            Some(Vec::new())
        );
    }
}
