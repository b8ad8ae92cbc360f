// CLI commands for local judging and catalogue management
use anyhow::{bail, Context, Result};
use proctor_common::config::JudgeConfig;
use proctor_common::redis::put_problem;
use proctor_common::types::Problem;
use proctor_judge::harness::is_valid_identifier;
use proctor_judge::{InMemoryProblemStore, JudgeService};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Load a JSON array of problems
fn load_problems(path: &Path) -> Result<Vec<Problem>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Collect every problem in the list that the judge could not run
pub fn validate_problems(problems: &[Problem]) -> Vec<String> {
    let mut issues = Vec::new();
    let mut seen = HashSet::new();

    for problem in problems {
        if problem.id.trim().is_empty() {
            issues.push("problem with empty id".to_string());
        } else if !seen.insert(problem.id.as_str()) {
            issues.push(format!("{}: duplicate id", problem.id));
        }

        if !is_valid_identifier(&problem.entry_function_name) {
            issues.push(format!(
                "{}: functionName '{}' is not a valid JavaScript identifier",
                problem.id, problem.entry_function_name
            ));
        }

        if problem.test_cases.is_empty() {
            issues.push(format!("{}: no test cases", problem.id));
        }
    }

    issues
}

fn ensure_valid(problems: &[Problem]) -> Result<()> {
    let issues = validate_problems(problems);
    if issues.is_empty() {
        return Ok(());
    }
    for issue in &issues {
        eprintln!("  ✗ {}", issue);
    }
    bail!("{} problem(s) failed validation", issues.len())
}

/// Judge a local source file and print the result as JSON
pub async fn run_local(problem_path: &Path, code_path: &Path, language: &str) -> Result<()> {
    let content = fs::read_to_string(problem_path)
        .with_context(|| format!("Failed to read {}", problem_path.display()))?;
    let problem: Problem = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {}", problem_path.display()))?;
    ensure_valid(std::slice::from_ref(&problem))?;

    let code = fs::read_to_string(code_path)
        .with_context(|| format!("Failed to read {}", code_path.display()))?;

    let config = JudgeConfig::from_env()
        .map_err(anyhow::Error::msg)
        .context("Invalid judge configuration")?;

    let problem_id = problem.id.clone();
    let store = InMemoryProblemStore::with_problems(vec![problem]);
    let judge = JudgeService::new(Arc::new(store), config);

    let result = judge.run(&code, language, &problem_id).await;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

/// Validate a problem list and write it to Redis
pub async fn seed_problems(path: &Path, redis_url: &str) -> Result<()> {
    let problems = load_problems(path)?;
    ensure_valid(&problems)?;

    println!("🌱 Seeding {} problem(s) into {}", problems.len(), redis_url);

    let client = redis::Client::open(redis_url).context("Failed to create Redis client")?;
    let mut conn = redis::aio::ConnectionManager::new(client)
        .await
        .context("Failed to connect to Redis")?;

    for problem in &problems {
        put_problem(&mut conn, problem)
            .await
            .with_context(|| format!("Failed to store problem '{}'", problem.id))?;
        println!("  ✓ {} ({} test cases)", problem.id, problem.test_cases.len());
    }

    println!("✅ Problems seeded successfully");
    Ok(())
}

/// Validate a problem list without touching Redis
pub fn check_problems(path: &Path) -> Result<()> {
    let problems = load_problems(path)?;
    ensure_valid(&problems)?;

    let hidden: usize = problems
        .iter()
        .map(|p| p.test_cases.iter().filter(|tc| tc.hidden).count())
        .sum();
    println!(
        "✅ {} problem(s) valid ({} hidden test cases)",
        problems.len(),
        hidden
    );
    Ok(())
}
