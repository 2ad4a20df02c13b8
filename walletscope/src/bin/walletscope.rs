use clap::Parser;
use walletscope::engine::InspectArgs;
use walletscope::engine::Inspector;
use walletscope::error::Result;

#[tokio::main]
async fn main() -> Result<()> {
  Inspector::run(InspectArgs::parse()).await?;
  Ok(())
}
