use std::io::{self, Write};
use std::path::Path;

use crate::sim::Sample;

/// Write a recorded drive in CSV format.
///
/// Columns: time, x (north), y (east), z (up), speed, psi_deg, theta_deg,
///          force, torque
pub fn write_trajectory<W: Write>(writer: &mut W, samples: &[Sample]) -> io::Result<()> {
    writeln!(writer, "time,x,y,z,speed,psi_deg,theta_deg,force,torque")?;

    for s in samples {
        let st = &s.state;
        writeln!(
            writer,
            "{:.4},{:.4},{:.4},{:.4},{:.4},{:.3},{:.3},{:.3},{:.4}",
            s.time,
            st.pos.x, st.pos.y, st.pos.z,
            st.vel,
            st.psi.to_degrees(),
            st.theta.to_degrees(),
            s.input.force,
            s.input.torque,
        )?;
    }

    Ok(())
}

/// Write a recorded drive to a CSV file at the given path.
pub fn write_trajectory_file(path: impl AsRef<Path>, samples: &[Sample]) -> io::Result<()> {
    let mut file = io::BufWriter::new(std::fs::File::create(path)?);
    write_trajectory(&mut file, samples)?;
    file.flush()
}
