//! Prompt construction for advice requests.

use crate::analysis::sum_entries;
use crate::models::{GlobalMetrics, WealthRecord};

/// System instruction fixing persona, style and response language.
pub fn system_instruction(language: &str) -> String {
    format!(
        "You are a professional wealth advisor. Analyze the provided portfolio and give concise advice in {}.",
        language
    )
}

/// User prompt summarising the quarter.
pub fn build_prompt(record: &WealthRecord, metrics: &GlobalMetrics) -> String {
    let breakdown: Vec<String> = record
        .data
        .iter()
        .map(|(category, entries)| format!("- {}: {}", category.key(), sum_entries(entries)))
        .collect();

    let mut prompt = String::new();
    prompt.push_str(
        "Analyze this user's asset allocation for the current quarter and provide 3-4 professional financial insights.\n\n",
    );
    prompt.push_str("Data summary:\n");
    prompt.push_str(&format!("- Total Assets: {}\n", metrics.total_assets));
    prompt.push_str(&format!("- Disposable Assets: {}\n", metrics.disposable_assets));
    prompt.push_str(&format!(
        "- Market Index Exposure (Pension + Index Funds): {}\n\n",
        metrics.total_market_index
    ));
    prompt.push_str("Category breakdown (summarized):\n");
    prompt.push_str(&breakdown.join("\n"));
    prompt.push_str("\n\nConsider:\n");
    prompt.push_str("1. Diversification (Bitcoin, Stocks, Bonds, Cash)\n");
    prompt.push_str("2. Liquidity (Cash vs Real Estate)\n");
    prompt.push_str("3. Long-term strategy (Index funds vs Individual stocks)\n\n");
    prompt.push_str("Respond in a professional, encouraging tone. Keep it concise.");

    prompt
}
