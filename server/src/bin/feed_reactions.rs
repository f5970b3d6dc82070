use birdgate::{
    feed::{FeedClient, DEFAULT_FEED_BASE_URL, DEFAULT_PAGE_LIMIT},
    setup::setup_tracing,
};
use clap::Parser;

/// Print the reaction count of every comment on a user's reader feed
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Numeric id of the feed's owner
    user_id: u64,

    /// How many feed pages to walk
    #[arg(long, default_value_t = DEFAULT_PAGE_LIMIT)]
    pages: usize,

    #[arg(long, default_value = DEFAULT_FEED_BASE_URL)]
    base_url: String,
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    setup_tracing("feed_reactions")?;

    let cli = Cli::parse();
    let client = FeedClient::new(&cli.base_url)?;
    let counts = client.reaction_counts(cli.user_id, cli.pages).await?;

    for count in &counts {
        println!("{}", count);
    }
    println!("Total reactions: {}", counts.iter().sum::<u64>());

    Ok(())
}
