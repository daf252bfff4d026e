use vo_slam::{DetectorConfig, PipelineConfig, TrackerConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("🔧 Pipeline Configuration Serialization Demo");
    println!("============================================\n");

    // Demo 1: Create configurations
    println!("📋 Demo 1: Creating Configurations");

    let default_cfg = PipelineConfig::new(640, 480);
    let sparse_cfg = PipelineConfig::with_detector(DetectorConfig::sparse_preset(320, 240));
    let mut coarse_cfg = PipelineConfig::with_detector(DetectorConfig::dense_preset(640, 480));
    coarse_cfg.tracker = TrackerConfig::coarse_only();
    coarse_cfg.trajectory_capacity = 200;

    for cfg in [&default_cfg, &sparse_cfg, &coarse_cfg] {
        cfg.validate()?;
        println!("   • {}", cfg.summary());
    }

    // Demo 2: JSON
    println!("\n📄 Demo 2: JSON Serialization");
    let json = sparse_cfg.to_json()?;
    println!("   Sparse config JSON (first 200 chars):");
    println!("   {}", &json[..200.min(json.len())]);
    sparse_cfg.save_json("sparse_pipeline.json")?;

    // Demo 3: TOML
    println!("\n📋 Demo 3: TOML Serialization");
    let toml_str = coarse_cfg.to_toml()?;
    println!("   Coarse config TOML (first 300 chars):");
    println!("   {}", &toml_str[..300.min(toml_str.len())]);
    coarse_cfg.save_toml("coarse_pipeline.toml")?;

    // Demo 4: Load by extension
    println!("\n🔍 Demo 4: Loading and Validation");
    let loaded_json = PipelineConfig::load("sparse_pipeline.json")?;
    let loaded_toml = PipelineConfig::load("coarse_pipeline.toml")?;
    println!("   • From JSON: {}", loaded_json.summary());
    println!("   • From TOML: {}", loaded_toml.summary());

    // Demo 5: Round trip
    println!("\n🔄 Demo 5: Round-trip Testing");
    assert_eq!(loaded_json, sparse_cfg);
    assert_eq!(loaded_toml, coarse_cfg);
    assert_eq!(PipelineConfig::from_json(&default_cfg.to_json()?)?, default_cfg);
    println!("   ✅ Round-trip serialization is consistent");

    // Demo 6: Invalid configs are rejected on load
    println!("\n🚫 Demo 6: Validation on Load");
    let broken = json.replace("\"trajectory_capacity\": 500", "\"trajectory_capacity\": 0");
    match PipelineConfig::from_json(&broken) {
        Ok(_) => println!("   ⚠️  Broken config was accepted"),
        Err(e) => println!("   Rejected: {}", e),
    }

    println!("\n🎉 Configuration serialization demo completed successfully!");
    println!("📁 Generated files: sparse_pipeline.json, coarse_pipeline.toml");

    Ok(())
}
