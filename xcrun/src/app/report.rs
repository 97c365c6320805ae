use super::pipeline::XcResults;
use crate::config::Configuration;
use nalgebra::DMatrix;
use std::io::{self, Write};

pub fn print_configuration<W: Write>(out: &mut W, config: &Configuration) -> io::Result<()> {
    writeln!(out, "Configuration")?;
    writeln!(out, "-> Input file        : {}", config.input_file().display())?;
    writeln!(out, "-> Model             : {}", config.model())?;
    writeln!(out, "-> Grid              : {}", config.grid_size())?;
    writeln!(out, "-> Radial quadrature : {}", config.radial_quad())?;
    writeln!(out, "-> Pruning scheme    : {}", config.pruning())?;
    writeln!(out, "-> LB exec space     : {}", config.lb_exec_space())?;
    writeln!(out, "-> Int exec space    : {}", config.int_exec_space())?;
    writeln!(out, "-> Batch size        : {}", config.batch_size())?;
    writeln!(out, "-> Basis tolerance   : {}", config.basis_tol())?;
    writeln!(out)
}

pub fn print_results<W: Write>(out: &mut W, results: &XcResults) -> io::Result<()> {
    writeln!(out, "Results")?;
    writeln!(out, "-> EXC : {:.10}", results.exc)?;
    print_matrix(out, "VXC (scalar)", &results.vxc_scalar)?;
    print_matrix(out, "VXC (z)", &results.vxc_z)?;
    writeln!(out)
}

fn print_matrix<W: Write>(out: &mut W, label: &str, matrix: &DMatrix<f64>) -> io::Result<()> {
    writeln!(out, "-> {label} : {} x {}", matrix.nrows(), matrix.ncols())?;
    for row in matrix.row_iter() {
        for value in row.iter() {
            write!(out, " {:>16.10}", value)?;
        }
        writeln!(out)?;
    }
    Ok(())
}
