mod irreducible;

pub use irreducible::create_irreducible_mesh;
