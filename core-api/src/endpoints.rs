//! Backend routes used by the client.

pub const AUTH_LOGIN: &str = "/api/v1/auth/login";
pub const AUTH_REGISTER: &str = "/api/v1/auth/register";
pub const AUTH_ME: &str = "/api/v1/auth/me";

pub const RAG_QUERY: &str = "/api/v1/rag/query";

pub const TIMETABLE_ASK: &str = "/api/v1/timetable/ask";
pub const TIMETABLE_ME: &str = "/api/v1/timetable/me";
