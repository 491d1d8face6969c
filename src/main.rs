use quadflock::models::obstacles::demo_obstacles;
use quadflock::models::quadrotors::{
    demo_config, formation_configs, QuadrotorSwarm, DEMO_DT, DEMO_TIME_LIMIT, FORMATION_SPACING,
};
use quadflock::{Engine, RunOutcome, SwarmConfig, SwarmError};

fn main() -> Result<(), SwarmError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Необязательный аргумент: путь к JSON-конфигу роя.
    let config = match std::env::args().nth(1) {
        Some(file) => SwarmConfig::from_file(file)?,
        None => demo_config(),
    };
    let path = config.validate()?;

    let bodies = formation_configs(config.agents, &path, FORMATION_SPACING);
    let swarm = QuadrotorSwarm::new(&bodies, DEMO_DT)
        .with_obstacles(demo_obstacles())
        .with_time_limit(DEMO_TIME_LIMIT);

    let mut engine = Engine::new(config, swarm)?;
    let outcome = engine.run();

    match &outcome {
        RunOutcome::Completed(_) => println!("run completed in {} ticks", engine.ticks()),
        RunOutcome::InProgress(_) => println!("run interrupted after {} ticks", engine.ticks()),
    }
    for (i, d) in outcome.durations().iter().enumerate() {
        println!("edge #{}: {:.3} s", i, d);
    }
    println!("sim t = {:.3} s", engine.env().time());
    Ok(())
}
