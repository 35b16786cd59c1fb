use clap::{Parser, Subcommand};
use spectral_delay_core::{
    buffer_decay, describe_all, process, set_curves, EffectInstance, EngineConfig, Param,
    ANALYSIS_WINDOW,
};
use tracing_subscriber::EnvFilter;

fn main() -> spectral_delay_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Demo {
            sample_rate,
            block_size,
            buffers,
        } => run_demo(sample_rate, block_size, buffers),
        Commands::Params => dump_params(),
    }
}

/// Pushes a generated tone through one effect instance and logs what the
/// spectrum readback sees, standing in for the plugin host's callback loop.
fn run_demo(sample_rate: u32, block_size: usize, buffers: usize) -> spectral_delay_core::Result<()> {
    let config = EngineConfig {
        sample_rate,
        block_size,
        analysis_window: ANALYSIS_WINDOW,
    };
    tracing::info!(?config, buffers, "starting demo run");

    set_curves(&[0.0, 0.5, 1.0, 0.5, 0.0], &[0.5])?;

    let sample_rate = config.sample_rate as f32;
    let mut instance = EffectInstance::create(sample_rate);
    instance.params().set_value(Param::ShowSpectrum as usize, 1.0)?;
    let handle = instance.handle();

    let decay = buffer_decay(config.block_size, sample_rate);
    tracing::info!(decay, "per-buffer spectrum decay");

    let mut output = vec![0.0_f32; config.block_size];
    let mut bins = vec![0.0_f32; 64];
    for buffer in 0..buffers {
        let offset = buffer * config.block_size;
        let input: Vec<f32> = (0..config.block_size)
            .map(|n| {
                let t = (offset + n) as f32 / sample_rate;
                (2.0 * std::f32::consts::PI * 440.0 * t).sin()
            })
            .collect();

        process(
            &mut instance,
            &input,
            &mut output,
            config.block_size,
            1,
            1,
            sample_rate,
        );

        let bin_count = bins.len();
        handle.read_named_buffer("InputSpec", &mut bins, bin_count);
        let input_peak = bins.iter().cloned().fold(0.0, f32::max);
        handle.read_named_buffer("OutputSpec", &mut bins, bin_count);
        let output_peak = bins.iter().cloned().fold(0.0, f32::max);
        tracing::debug!(buffer, input_peak, output_peak, "buffer processed");
    }

    let last = output.last().copied().unwrap_or_default();
    tracing::info!(last_sample = last, "demo run complete");
    instance.release();
    Ok(())
}

fn dump_params() -> spectral_delay_core::Result<()> {
    let table = describe_all();
    let json = serde_json::to_string_pretty(table)
        .map_err(|err| spectral_delay_core::SpectralDelayError::msg(err.to_string()))?;
    println!("{json}");
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Spectral Delay effect engine demo driver", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a generated tone through the effect and log spectrum activity.
    Demo {
        /// Sample rate to simulate the host at.
        #[arg(long, default_value_t = 48_000)]
        sample_rate: u32,
        /// Frames per processing buffer.
        #[arg(long, default_value_t = 1024)]
        block_size: usize,
        /// Number of buffers to push through the instance.
        #[arg(long, default_value_t = 64)]
        buffers: usize,
    },
    /// Print the parameter descriptor table as JSON.
    Params,
}
