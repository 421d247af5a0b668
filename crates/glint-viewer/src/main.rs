use anyhow::{Result, bail};
use clap::Parser;
use glint_engine::device::GpuInit;
use glint_engine::host::SceneHost;
use glint_engine::logging::{LoggingConfig, init_logging};
use glint_engine::scene::presets;
use glint_engine::shader::FailurePolicy;
use glint_engine::window::{Runtime, RuntimeConfig};

#[derive(Parser, Debug)]
#[command(
    name = "glint-viewer",
    version,
    about = "Draws one of the built-in scenes in a window"
)]
struct Args {
    /// Abort setup when a shader, attribute or uniform fails to resolve
    #[arg(long)]
    strict: bool,

    /// Print the scene names and exit
    #[arg(long)]
    list: bool,

    /// Scene to draw
    #[arg(default_value = "rotating_triangle")]
    scene: String,
}

impl Args {
    fn policy(&self) -> FailurePolicy {
        if self.strict {
            FailurePolicy::Strict
        } else {
            FailurePolicy::Permissive
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(LoggingConfig::default());

    if args.list {
        for name in presets::NAMES {
            println!("{name}");
        }
        return Ok(());
    }

    let scene = &args.scene;
    let Some(desc) = presets::by_name(scene) else {
        bail!(
            "unknown scene `{scene}`; available: {}",
            presets::NAMES.join(", ")
        );
    };
    let policy = args.policy();
    log::info!("starting `{scene}` ({policy:?})");

    let config = RuntimeConfig {
        title: format!("glint - {scene}"),
        ..RuntimeConfig::default()
    };
    Runtime::run(
        config,
        GpuInit::default(),
        SceneHost::new(desc).with_policy(policy),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_rotating_triangle() {
        let args = Args::try_parse_from(["glint-viewer"]).unwrap();
        assert_eq!(args.scene, "rotating_triangle");
        assert!(!args.list);
        assert_eq!(args.policy(), FailurePolicy::Permissive);
    }

    #[test]
    fn strict_flag_and_scene() {
        let args = Args::try_parse_from(["glint-viewer", "--strict", "indexed_quad"]).unwrap();
        assert_eq!(args.scene, "indexed_quad");
        assert_eq!(args.policy(), FailurePolicy::Strict);
    }

    #[test]
    fn unknown_flag_is_rejected() {
        let err = Args::try_parse_from(["glint-viewer", "--fast"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::UnknownArgument);
    }

    #[test]
    fn every_listed_scene_resolves() {
        for name in presets::NAMES {
            let args = Args::try_parse_from(["glint-viewer", name]).unwrap();
            assert!(presets::by_name(&args.scene).is_some(), "{name}");
        }
    }
}
