//! Request DTOs for mutations
//!
//! Bodies sent on create/update calls. `validate` is the boundary check
//! the form layer would normally run; a failure never reaches the network.

use serde::Serialize;

/// Body for creating a post (POST /posts)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPost {
    pub user_id: u64,
    pub title: String,
    pub body: String,
}

impl NewPost {
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.title.trim().is_empty() {
            return Some("Title cannot be empty".to_string());
        }
        if self.title.len() > 200 {
            return Some("Title exceeds maximum length of 200 characters".to_string());
        }
        None
    }
}

/// Body for updating a post (PUT /posts/:id)
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl PostUpdate {
    pub fn validate(&self) -> Option<String> {
        match &self.title {
            Some(title) if title.trim().is_empty() => Some("Title cannot be empty".to_string()),
            _ => None,
        }
    }
}

/// Body for creating a user (POST /users)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
}

impl NewUser {
    pub fn validate(&self) -> Option<String> {
        if self.name.trim().is_empty() {
            return Some("Name cannot be empty".to_string());
        }
        if !self.email.contains('@') {
            return Some("Email address is invalid".to_string());
        }
        None
    }
}

/// Body for updating a user (PUT /users/:id)
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_post_serializes_camel_case() {
        let post = NewPost {
            user_id: 7,
            title: "Hello".to_string(),
            body: "World".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&post).unwrap(),
            json!({"userId": 7, "title": "Hello", "body": "World"})
        );
    }

    #[test]
    fn test_validate_empty_title() {
        let post = NewPost {
            user_id: 1,
            title: "   ".to_string(),
            body: String::new(),
        };
        assert!(post.validate().is_some());
    }

    #[test]
    fn test_post_update_skips_missing_fields() {
        let update = PostUpdate {
            title: Some("New".to_string()),
            body: None,
        };
        assert_eq!(serde_json::to_value(&update).unwrap(), json!({"title": "New"}));
    }

    #[test]
    fn test_validate_user_email() {
        let user = NewUser {
            name: "Ada".to_string(),
            email: "ada.example.com".to_string(),
        };
        assert_eq!(user.validate().as_deref(), Some("Email address is invalid"));
    }
}
