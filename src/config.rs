use std::env;

#[derive(Clone, Debug)]
pub struct Config {
    pub web_server_host: String,
    pub web_server_port: u16,
    pub upstream_base_url: String,
    pub allowed_origin: String,
    pub upstream_timeout_secs: u64,
    pub assessment_time_limit_secs: u32,
    pub session_ttl_secs: u64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            web_server_host: env::var("WEB_SERVER_HOST")
                .unwrap_or_else(|_| "localhost".to_string()),
            web_server_port: env::var("WEB_SERVER_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            upstream_base_url: env::var("QUIZ_UPSTREAM_BASE_URL")
                .unwrap_or_else(|_| "https://zettanix.in".to_string()),
            allowed_origin: env::var("FRONTEND_ORIGIN")
                .unwrap_or_else(|_| "https://quiz-new-j3wl.vercel.app".to_string()),
            upstream_timeout_secs: env::var("UPSTREAM_TIMEOUT_SECS")
                .ok()
                .and_then(|t| t.parse().ok())
                .unwrap_or(30),
            assessment_time_limit_secs: env::var("ASSESSMENT_TIME_LIMIT_SECS")
                .ok()
                .and_then(|t| t.parse().ok())
                .unwrap_or(3600),
            session_ttl_secs: env::var("SESSION_TTL_SECS")
                .ok()
                .and_then(|t| t.parse().ok())
                .unwrap_or(7200),
        }
    }

    #[cfg(test)]
    pub fn test_config() -> Self {
        Self {
            web_server_host: "127.0.0.1".to_string(),
            web_server_port: 8080,
            upstream_base_url: "http://127.0.0.1:9".to_string(),
            allowed_origin: "http://localhost:5173".to_string(),
            upstream_timeout_secs: 2,
            assessment_time_limit_secs: 3600,
            session_ttl_secs: 7200,
        }
    }
}
