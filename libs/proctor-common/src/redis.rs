use crate::types::Problem;
use redis::{AsyncCommands, RedisResult};

/// Redis layout for the problem catalogue.
/// The judge only reads; `proctor-cli seed` is the writer.

pub const PROBLEM_PREFIX: &str = "proctor:problem";
pub const PROBLEM_INDEX: &str = "proctor:problems";

/// Generate deterministic key for a problem
pub fn problem_key(problem_id: &str) -> String {
    format!("{}:{}", PROBLEM_PREFIX, problem_id)
}

fn encode_error(e: serde_json::Error) -> redis::RedisError {
    redis::RedisError::from((redis::ErrorKind::TypeError, "serialization error", e.to_string()))
}

fn decode_error(e: serde_json::Error) -> redis::RedisError {
    redis::RedisError::from((redis::ErrorKind::TypeError, "deserialization error", e.to_string()))
}

/// Store a problem and register its id in the catalogue index
pub async fn put_problem(
    conn: &mut redis::aio::ConnectionManager,
    problem: &Problem,
) -> RedisResult<()> {
    let payload = serde_json::to_string(problem).map_err(encode_error)?;

    let _: () = conn.set(problem_key(&problem.id), payload).await?;
    let _: () = conn.sadd(PROBLEM_INDEX, &problem.id).await?;

    Ok(())
}

/// Retrieve a problem by id
pub async fn get_problem(
    conn: &mut redis::aio::ConnectionManager,
    problem_id: &str,
) -> RedisResult<Option<Problem>> {
    let payload: Option<String> = conn.get(problem_key(problem_id)).await?;

    match payload {
        Some(data) => {
            let problem: Problem = serde_json::from_str(&data).map_err(decode_error)?;
            Ok(Some(problem))
        }
        None => Ok(None),
    }
}

/// List the ids of all stored problems, sorted
pub async fn list_problem_ids(conn: &mut redis::aio::ConnectionManager) -> RedisResult<Vec<String>> {
    let mut ids: Vec<String> = conn.smembers(PROBLEM_INDEX).await?;
    ids.sort();
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_problem_key_format() {
        assert_eq!(problem_key("two-sum"), "proctor:problem:two-sum");
    }

    #[test]
    fn test_problem_key_deterministic() {
        assert_eq!(problem_key("abc"), problem_key("abc"));
        assert_ne!(problem_key("abc"), problem_key("abd"));
    }

    #[test]
    fn test_index_outside_problem_namespace() {
        assert!(!PROBLEM_INDEX.starts_with(&format!("{}:", PROBLEM_PREFIX)));
    }
}
