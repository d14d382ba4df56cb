// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::fetch::SessionIdentity;

const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_2) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.2 Safari/605.1.15",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36 Edg/120.0.0.0",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
];

const ACCEPT_LANGUAGES: &[&str] = &["en-US,en;q=0.9", "en-GB,en;q=0.8", "en-US,en;q=0.5"];

/// 会话身份池
///
/// 轮换时随机挑选一个与当前身份不同的组合（池子允许的话）
#[derive(Debug, Clone)]
pub struct IdentityPool {
    user_agents: Vec<String>,
}

impl Default for IdentityPool {
    fn default() -> Self {
        Self::new(USER_AGENTS.iter().map(|s| s.to_string()).collect())
    }
}

impl IdentityPool {
    /// 使用自定义 UA 列表，空列表退回内置列表
    pub fn new(user_agents: Vec<String>) -> Self {
        let user_agents = if user_agents.is_empty() {
            USER_AGENTS.iter().map(|s| s.to_string()).collect()
        } else {
            user_agents
        };
        Self { user_agents }
    }

    pub fn len(&self) -> usize {
        self.user_agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.user_agents.is_empty()
    }

    /// 随机身份
    pub fn random(&self) -> SessionIdentity {
        let user_agent = self.user_agents[rand::random_range(0..self.user_agents.len())].clone();
        build_identity(user_agent)
    }

    /// 换一个 UA 不同于 `current` 的身份
    pub fn rotate_from(&self, current: &SessionIdentity) -> SessionIdentity {
        let candidates: Vec<&String> = self
            .user_agents
            .iter()
            .filter(|ua| **ua != current.user_agent)
            .collect();

        match candidates.len() {
            0 => self.random(),
            n => build_identity(candidates[rand::random_range(0..n)].clone()),
        }
    }
}

fn build_identity(user_agent: String) -> SessionIdentity {
    let language = ACCEPT_LANGUAGES[rand::random_range(0..ACCEPT_LANGUAGES.len())];
    SessionIdentity {
        user_agent,
        headers: vec![
            (
                "Accept".to_string(),
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8".to_string(),
            ),
            ("Accept-Language".to_string(), language.to_string()),
            ("DNT".to_string(), "1".to_string()),
            ("Upgrade-Insecure-Requests".to_string(), "1".to_string()),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_changes_user_agent() {
        let pool = IdentityPool::default();
        let mut current = pool.random();
        for _ in 0..50 {
            let next = pool.rotate_from(&current);
            assert_ne!(next.user_agent, current.user_agent);
            current = next;
        }
    }

    #[test]
    fn test_single_agent_pool_reuses_it() {
        let pool = IdentityPool::new(vec!["only-agent".to_string()]);
        let current = pool.random();
        assert_eq!(pool.rotate_from(&current).user_agent, "only-agent");
    }

    #[test]
    fn test_empty_pool_falls_back_to_builtin() {
        assert_eq!(IdentityPool::new(Vec::new()).len(), USER_AGENTS.len());
    }
}
