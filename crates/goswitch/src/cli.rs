use anyhow::{Context as _, Result, bail};
use clap::{Parser, Subcommand};
use goswitch_env::EnvironmentBuilder;
use goswitch_platform::{EnvMap, Target};
use goswitch_shim::{Dispatcher, ShimWriter};
use goswitch_store::{
    AliasStore, Layout, ResolvedVersion, Settings, SourceChain, VersionSource, read_version_file,
    write_version_file,
};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

const LOCAL_VERSION_FILE: &str = ".go-version";

#[derive(Debug, Parser)]
#[command(name = "goswitch", version = env!("CARGO_PKG_VERSION"), about, long_about = None, propagate_version = true)]
pub struct App {
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run a command with the selected Go version
    Exec {
        command: String,
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args:    Vec<OsString>,
    },
    /// Regenerate shims for every installed version
    Rehash,
    /// Print the version in effect
    VersionName,
    /// Print where the version in effect was set
    VersionOrigin,
    /// Print the version file in effect
    VersionFile,
    /// Show or set the version for the current directory
    Local {
        #[arg(id = "version_spec", value_name = "VERSION")]
        version: Option<String>,
    },
    /// Show or set the global version
    Global {
        #[arg(id = "version_spec", value_name = "VERSION")]
        version: Option<String>,
    },
    /// Print the binary a command would run
    Which { command: String },
    /// List installed versions providing a command
    Whence { command: String },
    #[command(subcommand)]
    Alias(AliasCommands),
    /// List the hooks for an event, in execution order
    Hooks { event: String },
    /// Print the build-cache key of the version in effect
    CacheKey,
}

#[derive(Debug, Subcommand)]
pub enum AliasCommands {
    Set { name: String, target: String },
    Unset { name: String },
    #[command(alias = "ls")]
    List,
}

/// Root, settings and environment of one invocation.
pub struct Context {
    pub env:      EnvMap,
    pub cwd:      PathBuf,
    pub layout:   Layout,
    pub settings: Settings,
}

impl Context {
    pub fn load(env: EnvMap) -> Result<Self> {
        let cwd = std::env::current_dir().context("cannot read the current directory")?;
        let layout = Layout::from_env(&env)?;
        let settings = Settings::load(&layout, &env)?;
        Ok(Self {
            env,
            cwd,
            layout,
            settings,
        })
    }

    /// Runs `cmd`, returning the process exit code.
    pub fn run(&self, cmd: Commands) -> Result<i32> {
        match cmd {
            Commands::Exec { command, args } => {
                let code = self
                    .dispatcher()
                    .with_program(current_program()?)
                    .exec(&command, &args)?;
                return Ok(code);
            }
            Commands::Rehash => {
                let report = ShimWriter::new(
                    &self.layout,
                    &self.settings,
                    &self.env,
                    current_program()?,
                )
                .rehash(&self.dispatcher().hooks())?;
                println!(
                    "{} shims written, {} removed",
                    report.written.len(),
                    report.removed.len()
                );
            }
            Commands::VersionName => {
                let version = self.chain().current_version(&self.cwd)?;
                version.require()?;
                println!("{}", version.name());
            }
            Commands::VersionOrigin => {
                let (_, source) = self.chain().current_spec(&self.cwd)?;
                println!("{}", source.origin());
            }
            Commands::VersionFile => {
                let path = self
                    .chain()
                    .version_file_path(&self.cwd)?
                    .unwrap_or_else(|| self.layout.global_file.clone());
                println!("{}", path.display());
            }
            Commands::Local { version } => {
                let path = self.cwd.join(LOCAL_VERSION_FILE);
                self.show_or_set(&path, version, VersionSource::LocalFile(path.clone()))?;
            }
            Commands::Global { version } => {
                let path = self.layout.global_file.clone();
                self.show_or_set(&path, version, VersionSource::GlobalFile(path.clone()))?;
            }
            Commands::Which { command } => {
                println!("{}", self.dispatcher().which(&command)?.display());
            }
            Commands::Whence { command } => {
                for version in self.dispatcher().whence(&command)? {
                    println!("{version}");
                }
            }
            Commands::Alias(cmd) => self.alias(cmd)?,
            Commands::Hooks { event } => {
                for hook in self.dispatcher().hooks().find(&event) {
                    println!("{}", hook.display());
                }
            }
            Commands::CacheKey => {
                let version = self.chain().current_version(&self.cwd)?;
                if version.is_system() {
                    bail!("the system version has no isolated build cache");
                }
                let env = EnvironmentBuilder::new(&self.layout, &self.settings).build(
                    &version,
                    &Target::from_env(&self.env),
                    &self.env,
                )?;
                match env.cache_key {
                    Some(key) => println!("{key}"),
                    None => bail!("build cache isolation is disabled"),
                }
            }
        }
        Ok(0)
    }

    fn alias(&self, cmd: AliasCommands) -> Result<()> {
        let mut store = AliasStore::open(&self.layout)?;
        match cmd {
            AliasCommands::Set { name, target } => store.set(&name, &target)?,
            AliasCommands::Unset { name } => {
                store.unset(&name)?;
            }
            AliasCommands::List => {
                for (name, target) in store.list() {
                    println!("{name} -> {target}");
                }
            }
        }
        Ok(())
    }

    fn show_or_set(&self, path: &Path, version: Option<String>, source: VersionSource) -> Result<()> {
        let Some(spec) = version else {
            match read_version_file(path)? {
                Some(version) => println!("{version}"),
                None => bail!("no version set in {}", path.display()),
            }
            return Ok(());
        };

        let resolved = ResolvedVersion {
            selection: self.chain().select(&spec)?,
            spec: spec.clone(),
            source,
        };
        resolved.require()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("cannot create {}", parent.display()))?;
        }
        write_version_file(path, &spec)?;
        Ok(())
    }

    fn chain(&self) -> SourceChain<'_> { SourceChain::new(&self.layout, &self.settings, &self.env) }

    fn dispatcher(&self) -> Dispatcher<'_> {
        Dispatcher::new(&self.layout, &self.settings, &self.env, &self.cwd)
    }
}

fn current_program() -> Result<PathBuf> {
    std::env::current_exe().context("cannot locate the goswitch binary")
}
