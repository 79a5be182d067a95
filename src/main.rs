use gridview::{layout, risk, scene::SceneDef};

fn main() -> anyhow::Result<()> {
    let (room, furniture) = layout::sample_room();

    let report = risk::assess(&room, &furniture)?;
    println!("layout risk score: {:.3}", report.score);
    for violation in &report.violations {
        println!("  {violation}");
    }

    gridview::run_with(SceneDef::from_layout(&room, &furniture)?)
}
