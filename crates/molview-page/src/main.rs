//! molview-probe: run one headless viewer session and report the outcome
//!
//! ```bash
//! molview-probe 1abc.pdb
//! molview-probe https://example.org/ligand.sdf --type sdf --spin x:0.5
//! molview-probe ethanol.mol2 --representation stick --color element --debug
//! ```

use std::cell::RefCell;
use std::process::ExitCode;
use std::rc::Rc;

use clap::Parser;

use molview_io::{FileFetcher, TextFetcher};
use molview_scene::{
    HeadlessEngine, InitOutcome, InlineMessage, MountSurface, Ready, SessionContext, ViewerSession,
};
use molview_settings::{
    resolve_style, ColorScheme, LoaderConfig, MountAttributes, Representation, SimpleStyle,
    StyleMode, ViewerRequest,
};

/// Load a molecular structure the way a page viewer would
#[derive(Parser, Debug)]
#[command(name = "molview-probe")]
#[command(version, about, long_about = None)]
struct Cli {
    /// URL or path of the structure file
    source: String,

    /// Declared format (pdb, sdf, mol2, xyz, cube) or auto
    #[arg(long = "type", value_name = "TYPE", default_value = "auto")]
    declared_type: String,

    /// Structured style as a JSON object
    #[arg(long, value_name = "JSON")]
    style: Option<String>,

    /// Representation for a derived style (cartoon, stick, ballandstick, surface, line, sphere)
    #[arg(long, value_name = "NAME")]
    representation: Option<String>,

    /// Color scheme for a derived style (spectrum, rainbow, chain, element, bfactor, ...)
    #[arg(long, value_name = "SCHEME")]
    color: Option<String>,

    #[arg(long, value_name = "RADIUS")]
    stick_radius: Option<f64>,

    #[arg(long, value_name = "SCALE")]
    sphere_scale: Option<f64>,

    #[arg(long, value_name = "OPACITY")]
    surface_opacity: Option<f64>,

    /// Spin directive: "true" or axis:speed
    #[arg(long, value_name = "SPIN")]
    spin: Option<String>,

    /// Loader configuration, as JSON text or a path to a JSON file
    #[arg(long, value_name = "CONFIG")]
    config: Option<String>,

    /// Verbose logging (same as "debug": true in the configuration)
    #[arg(long)]
    debug: bool,
}

impl Cli {
    fn loader_config(&self) -> Result<LoaderConfig, String> {
        let mut config = match self.config.as_deref() {
            None => LoaderConfig::default(),
            Some(raw) => {
                let text = if raw.trim_start().starts_with('{') {
                    raw.to_string()
                } else {
                    std::fs::read_to_string(raw).map_err(|e| format!("{}: {}", raw, e))?
                };
                LoaderConfig::from_json(&text).map_err(|e| e.to_string())?
            }
        };
        config.debug |= self.debug;
        Ok(config)
    }

    fn has_simple_settings(&self) -> bool {
        self.representation.is_some()
            || self.color.is_some()
            || self.stick_radius.is_some()
            || self.sphere_scale.is_some()
            || self.surface_opacity.is_some()
    }

    fn request(&self) -> ViewerRequest {
        let attrs = MountAttributes {
            declared_type: Some(self.declared_type.clone()),
            style: self.style.clone(),
            spin: self.spin.clone(),
            ..MountAttributes::with_url(self.source.clone())
        };
        let mut request = ViewerRequest::from_attributes(&attrs);

        if self.has_simple_settings() {
            let defaults = SimpleStyle::default();
            let simple = SimpleStyle {
                representation: self
                    .representation
                    .as_deref()
                    .map_or(defaults.representation, Representation::parse_lenient),
                color: self
                    .color
                    .as_deref()
                    .map_or(defaults.color, ColorScheme::parse_lenient),
                stick_radius: self.stick_radius.unwrap_or(defaults.stick_radius),
                sphere_scale: self.sphere_scale.unwrap_or(defaults.sphere_scale),
                surface_opacity: self.surface_opacity.unwrap_or(defaults.surface_opacity),
            };
            let mode = if self.style.is_some() {
                StyleMode::Json
            } else {
                StyleMode::Simple
            };
            request.style = resolve_style(mode, self.style.as_deref(), &simple);
        }
        request
    }
}

/// Terminal stand-in for a page mount
#[derive(Default)]
struct Terminal {
    messages: RefCell<Vec<InlineMessage>>,
}

impl MountSurface for Terminal {
    fn id(&self) -> &str {
        "probe"
    }

    fn is_attached(&self) -> bool {
        true
    }

    fn show_message(&self, message: InlineMessage) {
        self.messages.borrow_mut().push(message);
    }

    fn clear_messages(&self) {
        self.messages.borrow_mut().clear();
    }

    fn ensure_positioned(&self) {}

    fn disable_pointer_events(&self) {}
}

#[cfg(feature = "fetch")]
fn http_fetcher() -> Option<Rc<dyn TextFetcher>> {
    Some(Rc::new(molview_io::HttpFetcher::new()))
}

#[cfg(not(feature = "fetch"))]
fn http_fetcher() -> Option<Rc<dyn TextFetcher>> {
    None
}

fn fetcher_for(source: &str) -> Rc<dyn TextFetcher> {
    if source.starts_with("http://") || source.starts_with("https://") {
        if let Some(fetcher) = http_fetcher() {
            return fetcher;
        }
        log::warn!("built without HTTP support, treating {} as a path", source);
    }
    Rc::new(FileFetcher)
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match cli.loader_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("invalid configuration: {}", e);
            return ExitCode::from(2);
        }
    };

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.max_log_level().as_str()),
    )
    .init();

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            log::error!("failed to start runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let fetcher = fetcher_for(&cli.source);
    let context = SessionContext::new(
        Rc::new(HeadlessEngine::new(fetcher.clone())),
        Rc::new(Ready),
        fetcher,
    );
    let terminal = Rc::new(Terminal::default());
    let mut session = ViewerSession::new(cli.request(), terminal.clone(), context);

    let outcome = runtime.block_on(session.initialize());
    match outcome {
        Ok(InitOutcome::Rendered(report)) => {
            println!("format: {}", report.format);
            println!("path:   {:?}", report.path);
            println!("atoms:  {}", report.atom_count);
            if let Some(style) = session.applied_style() {
                println!("style:  {}", style);
            }
            if let Some(spin) = &session.request().spin {
                println!("spin:   {}", spin);
            }
            ExitCode::SUCCESS
        }
        Ok(InitOutcome::AlreadyInitialized) => ExitCode::SUCCESS,
        Err(e) => {
            let shown = terminal
                .messages
                .borrow()
                .last()
                .copied()
                .unwrap_or_else(|| e.inline_message());
            eprintln!("{}", shown);
            ExitCode::FAILURE
        }
    }
}
