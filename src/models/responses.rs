//! Resource models returned by the API
//!
//! Defines the shapes the service reads and caches.

use serde::{Deserialize, Serialize};

/// Number of posts shown in the dashboard's recent list.
pub const RECENT_POSTS_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: u64,
    pub user_id: u64,
    pub title: String,
    #[serde(default)]
    pub body: String,
}

/// Aggregated data for the dashboard view.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardData {
    pub total_users: usize,
    pub total_posts: usize,
    /// Newest posts first, by id
    pub recent_posts: Vec<Post>,
    pub users: Vec<User>,
    pub posts: Vec<Post>,
}

impl DashboardData {
    pub fn new(users: Vec<User>, posts: Vec<Post>) -> Self {
        let mut recent_posts = posts.clone();
        recent_posts.sort_by(|a, b| b.id.cmp(&a.id));
        recent_posts.truncate(RECENT_POSTS_LIMIT);

        Self {
            total_users: users.len(),
            total_posts: posts.len(),
            recent_posts,
            users,
            posts,
        }
    }
}

// == Fetched ==
/// Where a result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    /// A fresh network result or a still-valid cache entry
    Live,
    /// An expired cache entry served because the refetch failed
    Stale,
}

/// Result of a read that may degrade to stale data.
#[derive(Debug, Clone, PartialEq)]
pub struct Fetched<T> {
    pub data: T,
    pub source: DataSource,
    /// Creation time of the served cache entry, for stale results
    pub cached_at: Option<u64>,
}

impl<T> Fetched<T> {
    pub fn live(data: T) -> Self {
        Self {
            data,
            source: DataSource::Live,
            cached_at: None,
        }
    }

    pub fn stale(data: T, cached_at: u64) -> Self {
        Self {
            data,
            source: DataSource::Stale,
            cached_at: Some(cached_at),
        }
    }

    pub fn is_stale(&self) -> bool {
        self.source == DataSource::Stale
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn post(id: u64) -> Post {
        Post {
            id,
            user_id: 1,
            title: format!("post {}", id),
            body: String::new(),
        }
    }

    #[test]
    fn test_post_deserializes_camel_case() {
        let post: Post =
            serde_json::from_value(json!({"id": 3, "userId": 7, "title": "t"})).unwrap();
        assert_eq!(post.user_id, 7);
        assert_eq!(post.body, "");
    }

    #[test]
    fn test_dashboard_recent_posts() {
        let posts: Vec<Post> = (1..=8).map(post).collect();
        let dashboard = DashboardData::new(Vec::new(), posts);

        assert_eq!(dashboard.total_posts, 8);
        assert_eq!(dashboard.total_users, 0);
        let ids: Vec<u64> = dashboard.recent_posts.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![8, 7, 6, 5, 4]);
    }
}
