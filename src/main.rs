use anyhow::Context;
use clap::Parser;
use visiondeck::{
    config::Args,
    project::{Pipeline, ProjectSync},
    settings::{Settings, SharedSettings},
    timer::FpsCounter,
    ui::{self, hub::FrameHub, Server},
    webcam::Webcam,
};

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    visiondeck::init_logger!(args.verbose);

    let models = args.model_dir();
    models.check()?;
    let keys = args.key_backend();

    let settings = SharedSettings::new(Settings::new(args.project));
    let mut webcam = Webcam::open(args.webcam_options())?;
    let mut pipeline = Pipeline::new(args.project, &models, keys)?;

    let hub = FrameHub::new();
    let server = Server::bind(args.addr(), settings.clone(), hub.clone())?;
    log::info!("open http://{} in a browser", server.local_addr()?);
    server.spawn()?;
    let mut encoder = ui::spawn_encoder(hub)?;

    let mut sync = ProjectSync::new(&settings);
    let mut fps = FpsCounter::new("capture");
    loop {
        let mut frame = webcam.read().context("failed to read webcam frame")?;
        frame.flip_horizontal_in_place();

        let current = sync.sync(&settings, pipeline.project(), |project| {
            pipeline = Pipeline::new(project, &models, keys)?;
            Ok(())
        });
        if settings.take_clear_request() {
            pipeline.clear_canvas();
        }

        if let Err(e) = pipeline.process(&mut frame, &current) {
            log::error!("failed to process frame: {e:#}");
        }
        encoder.try_send(frame);

        fps.tick_with(pipeline.timers().into_iter().chain(webcam.timers()));
    }
}
