#[tempo::runtime]
fn main() {
    println!("A runtime must be async");
}
