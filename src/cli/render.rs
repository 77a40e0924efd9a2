use colored::*;

use crate::config::Config;
use crate::research::{ResearchOutcome, StageKind};

use super::util::preview;

const RULE_WIDTH: usize = 80;
const MAX_LISTED_SOURCES: usize = 10;

fn rule(ch: &str) -> String {
    ch.repeat(RULE_WIDTH)
}

pub(crate) fn header(query: &str, config: &Config) {
    println!("{}", rule("="));
    println!("{}", "🧠 SCOUT RESEARCH ORCHESTRATOR".bold());
    println!(
        "   Model: {} @ {}",
        config.llm.model, config.llm.base_url
    );
    let search_mode = if config.search.is_configured() {
        "web".green()
    } else {
        "mock".yellow()
    };
    println!("   Search: {search_mode}");
    println!("{}", rule("="));
    println!("\n📝 Research Query: {}\n", query.bold());
}

pub(crate) fn outcome(outcome: &ResearchOutcome) {
    metrics(outcome);
    report(outcome);
    sources(outcome);
    workflow(outcome);
}

fn metrics(outcome: &ResearchOutcome) {
    println!("{}", rule("="));
    println!("{}", "📊 RESEARCH RESULTS".bold());
    println!("{}", rule("="));
    println!("🎯 Query: {}", outcome.query);
    println!("📈 Confidence: {}%", outcome.confidence);
    println!("📚 Sources: {}", outcome.sources);
    println!("🔄 Iterations: {}", outcome.iterations);
    println!("🤖 Agents Used: {}", outcome.agents_used);
}

fn report(outcome: &ResearchOutcome) {
    println!("\n{}", rule("-"));
    println!("{}", "📄 FINAL REPORT".bold());
    println!("{}", rule("-"));
    println!("{}", outcome.report);
}

fn sources(outcome: &ResearchOutcome) {
    println!("\n{}", rule("-"));
    println!("{}", "🔗 SOURCES USED".bold());
    println!("{}", rule("-"));
    for (idx, source) in outcome
        .search_results
        .iter()
        .take(MAX_LISTED_SOURCES)
        .enumerate()
    {
        let title = if source.title.trim().is_empty() {
            "Untitled"
        } else {
            source.title.as_str()
        };
        println!("{}. {}", idx + 1, title.bold());
        println!("   URL: {}", source.url.cyan());
        println!("   Score: {:.2}", source.score);
        if let Some(date) = &source.published_date {
            println!("   Published: {date}");
        }
    }
}

fn workflow(outcome: &ResearchOutcome) {
    println!("\n{}", rule("-"));
    println!("{}", "🔄 AGENT WORKFLOW".bold());
    println!("{}", rule("-"));
    for (idx, record) in outcome.full_state.messages().iter().enumerate() {
        let label = record.stage.label().to_uppercase();
        let label = match record.stage {
            StageKind::Analyzer | StageKind::FactChecker => label.yellow(),
            StageKind::Writer | StageKind::Visualizer => label.green(),
            StageKind::Planner | StageKind::Researcher => label.cyan(),
        };
        println!("\n{}. {}", idx + 1, label);
        println!("   Time: {}", record.timestamp.to_rfc3339());
        if let Some(found) = record.results_found {
            println!("   Results found: {found}");
        }
        if let Some(words) = record.word_count {
            println!("   Words: {words}");
        }
        println!("   {}", preview(record.content.trim(), 120).dimmed());
    }
}
