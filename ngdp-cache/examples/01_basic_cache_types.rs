//! Basic usage example for ngdp-cache

use ngdp_cache::{cdn::CdnCache, generic::GenericCache, state::StateCache};
use ribbit_client::{Region, RibbitClient};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    println!("=== NGDP Cache Example ===\n");

    // Generic cache example
    println!("1. Generic Cache:");
    let generic = GenericCache::new().await?;
    generic.write_buffer("", "my_key", b"Hello, World!").await?;
    let mut file = generic.read_object("", "my_key").await?.unwrap();
    let mut data = Vec::new();
    tokio::io::AsyncReadExt::read_to_end(&mut file, &mut data).await?;
    println!("   Read from generic cache: {}", String::from_utf8_lossy(&data));

    // CDN cache example
    println!("\n2. CDN Cache:");
    let cdn = CdnCache::for_product("wow").await?;
    let archive_hash = "1234567890abcdef1234567890abcdef";
    cdn.write_archive(archive_hash, b"archive-data").await?;
    println!("   Archive cached at: {:?}", cdn.archive_path(archive_hash));

    // Patch-server state cache example
    println!("\n3. State Cache:");
    let state = StateCache::with_base_dir(ngdp_cache::get_cache_dir()?.join("state")).await?;
    let ribbit = RibbitClient::new(Region::US);
    let digest = state
        .fetch(&ribbit, "ribbit-us", "wow", ngdp_cache::remote::StateEndpoint::Cdns)
        .await?;
    println!("   Stored `cdns` response under digest {digest}");
    let cdns = state.get_cached_cdns("wow").await?;
    println!("   {} CDN configuration(s) cached", cdns.len());

    // Show cache directory
    println!("\n4. Cache Directory:");
    println!("   Base cache dir: {:?}", ngdp_cache::get_cache_dir()?);

    Ok(())
}
