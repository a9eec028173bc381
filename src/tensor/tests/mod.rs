mod index;
mod shape;
