use std::path::Path;

use anyhow::Context as _;
use ome_catalog::{CatalogFile, CatalogStore};
use tracing::info;

pub fn import(catalog: Option<&Path>, db: Option<&Path>) -> anyhow::Result<()> {
    let (Some(catalog), Some(db)) = (catalog, db) else {
        anyhow::bail!("import needs both --catalog and --db");
    };
    let file = CatalogFile::from_file(catalog)
        .with_context(|| format!("loading catalog {}", catalog.display()))?;
    let store = CatalogStore::open(db)
        .with_context(|| format!("opening catalog database {}", db.display()))?;
    let summary = store.import(&file)?;
    info!(db = %db.display(), ?summary, "catalog imported");

    println!("✓ Imported into {}", db.display());
    println!("  Namespace runtimes:  {}", summary.namespace_runtimes);
    println!("  Cluster runtimes:    {}", summary.cluster_runtimes);
    println!("  Accelerator classes: {}", summary.accelerator_classes);
    Ok(())
}
