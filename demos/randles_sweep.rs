use eisy::prelude::*;

fn main() -> Result<()> {
    // Randles cell: 20 Ω electrolyte, 250 Ω charge transfer, CPE double layer, Warburg tail.
    let spec = CircuitSpec::new(
        Topology::Randles,
        CircuitElements::from_pairs([
            ("Rs", 20.0),
            ("Rp", 250.0),
            ("Q", 2e-5),
            ("alpha", 0.85),
            ("sigma", 150.0),
        ]),
    )?;
    let sweep = freq_gen(1.0e5, 1.0e-2, 5)?;
    let noise = AlterationRequest::new(Alteration::ComplexNoise, 0.05);
    let options = SimulationOptions::default();
    let record = simulate(&sweep, &spec, Some(&noise), &options, &mut rand::rng())?;

    println!("freq(Hz), Re_Z(ohm), -Im_Z(ohm), Re_Z_noise(ohm), -Im_Z_noise(ohm)");
    let re = record.column("Re_Z [ohm]").unwrap_or_default();
    let im = record.column("Im_Z [ohm]").unwrap_or_default();
    let re_n = record.column("Re_Z_noise [ohm]").unwrap_or_default();
    let im_n = record.column("Im_Z_noise [ohm]").unwrap_or_default();
    for (i, f) in sweep.frequency().iter().enumerate() {
        println!("{f:.4e}, {:.4}, {:.4}, {:.4}, {:.4}", re[i], -im[i], re_n[i], -im_n[i]);
    }
    Ok(())
}
