//! Tool listing for an agent.

use std::error::Error;

use crate::api::client::AtlasClient;
use crate::core::config::Config;
use crate::ui::glyphs::{mention_state_glyph, resolve_tool_glyph, ToolIconSource};

pub async fn list_tools(config: &Config, agent_flag: Option<String>) -> Result<(), Box<dyn Error + Send + Sync>> {
    let agent_id = config.resolve_agent(agent_flag)?;
    let client = AtlasClient::new(config.effective_base_url(), config.resolve_api_key()?);

    let tools = client.list_available_tools(&agent_id).await?;

    println!("🧰 Tools for agent {agent_id}");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!();

    if tools.is_empty() {
        println!("No tools available to this agent.");
        return Ok(());
    }

    println!("Found {} tools:", tools.len());
    println!();
    for tool in &tools {
        let glyph = resolve_tool_glyph(&ToolIconSource::Classified(tool));
        let state = mention_state_glyph(tool.status.into());
        let count = tool
            .tool_count
            .map(|n| format!(" ({n} functions)"))
            .unwrap_or_default();
        println!(
            "  {state} {glyph} {} — {}{count}",
            tool.display_name,
            tool.status.label()
        );
    }
    println!();
    println!("● on agent   ◐ on account   ○ available to connect");

    Ok(())
}
