// ------------------------------------------------------------------------------- IMPORTS

use crate::CellType;

/// # Examples
/// ```
/// # use lgflow::functions;
/// # use lgflow::CellType;
/// let cells = functions::periodic_cells(8, 4);
/// assert_eq!(cells.len(), 32);
/// assert!(cells.iter().all(|&t| t == CellType::Fluid));
/// ```
pub fn periodic_cells(dim_x: usize, dim_y: usize) -> Vec<CellType> {
    vec![CellType::Fluid; dim_x * dim_y]
}

/// Channel with no-slip walls along the top and bottom rows.
pub fn pipe_cells(dim_x: usize, dim_y: usize) -> Vec<CellType> {
    let mut cells = periodic_cells(dim_x, dim_y);
    for x in 0..dim_x {
        cells[x] = CellType::SolidNoSlip;
        cells[(dim_y - 1) * dim_x + x] = CellType::SolidNoSlip;
    }
    cells
}

/// Channel with free-slip walls and a circular no-slip obstacle a quarter of
/// the way downstream, shedding a Karman vortex street once the flow is
/// driven eastward.
pub fn karman_cells(dim_x: usize, dim_y: usize) -> Vec<CellType> {
    let mut cells = periodic_cells(dim_x, dim_y);
    for x in 0..dim_x {
        cells[x] = CellType::SolidSlip;
        cells[(dim_y - 1) * dim_x + x] = CellType::SolidSlip;
    }
    let center_x = (dim_x / 4) as isize;
    let center_y = (dim_y / 2) as isize;
    let radius = (dim_y / 8).max(1) as isize;
    for y in 0..dim_y as isize {
        for x in 0..dim_x as isize {
            let dx = x - center_x;
            let dy = y - center_y;
            if dx * dx + dy * dy <= radius * radius {
                cells[(y * dim_x as isize + x) as usize] = CellType::SolidNoSlip;
            }
        }
    }
    cells
}

/// Closed box with no-slip walls on all four edges; pair with a seeded
/// region to watch one half diffuse into the other.
pub fn diffusion_cells(dim_x: usize, dim_y: usize) -> Vec<CellType> {
    let mut cells = pipe_cells(dim_x, dim_y);
    for y in 0..dim_y {
        cells[y * dim_x] = CellType::SolidNoSlip;
        cells[y * dim_x + dim_x - 1] = CellType::SolidNoSlip;
    }
    cells
}

/// Resolves a test-case name to its cell-type map.
///
/// # Examples
/// ```
/// # use lgflow::functions;
/// assert!(functions::case_cell_types("karman", 32, 16).is_some());
/// assert!(functions::case_cell_types("warp-drive", 32, 16).is_none());
/// ```
pub fn case_cell_types(name: &str, dim_x: usize, dim_y: usize) -> Option<Vec<CellType>> {
    match name {
        "periodic" => Some(periodic_cells(dim_x, dim_y)),
        "pipe" => Some(pipe_cells(dim_x, dim_y)),
        "karman" => Some(karman_cells(dim_x, dim_y)),
        "diffusion" => Some(diffusion_cells(dim_x, dim_y)),
        _ => None,
    }
}

// ---------------------------------------------------------------------------------- TESTS
