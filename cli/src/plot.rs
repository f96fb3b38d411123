use plotters::prelude::*;
use raceflow::core::ghost::GhostPath;

/// export_ghost_plot draws the saved ghost lap as a top-down x/z trajectory
/// and writes it as a PNG into output/. Returns the path of the written file.
pub fn export_ghost_plot(path: &GhostPath, save_name: &str) -> anyhow::Result<String> {
    if path.is_empty() {
        anyhow::bail!("No ghost samples to plot!");
    }

    let out_dir = std::path::Path::new("output");
    std::fs::create_dir_all(out_dir)?;
    let out_path = out_dir.join(format!("ghost_plot_{}.png", save_name));

    let mut x_min = f64::INFINITY;
    let mut x_max = f64::NEG_INFINITY;
    let mut z_min = f64::INFINITY;
    let mut z_max = f64::NEG_INFINITY;
    for sample in path.samples.iter() {
        let x = sample.position.x as f64;
        let z = sample.position.z as f64;
        if x < x_min {
            x_min = x;
        }
        if x > x_max {
            x_max = x;
        }
        if z < z_min {
            z_min = z;
        }
        if z > z_max {
            z_max = z;
        }
    }
    let margin = ((x_max - x_min).max(z_max - z_min) * 0.05).max(1.0);
    x_min -= margin;
    x_max += margin;
    z_min -= margin;
    z_max += margin;

    let root = BitMapBackend::new(&out_path, (1024, 768)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("Ghost lap trajectory ({:.3}s)", path.duration()),
            ("sans-serif", 24).into_font(),
        )
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_min..x_max, z_min..z_max)?;

    chart
        .configure_mesh()
        .x_desc("x (m)")
        .y_desc("z (m)")
        .label_style(("sans-serif", 16))
        .draw()?;

    chart.draw_series(LineSeries::new(
        path.samples
            .iter()
            .map(|sample| (sample.position.x as f64, sample.position.z as f64)),
        &BLUE,
    ))?;

    // start marker
    let first = &path.samples[0];
    chart.draw_series(std::iter::once(Circle::new(
        (first.position.x as f64, first.position.z as f64),
        5,
        GREEN.filled(),
    )))?;

    root.present()?;
    Ok(out_path.to_string_lossy().into_owned())
}
