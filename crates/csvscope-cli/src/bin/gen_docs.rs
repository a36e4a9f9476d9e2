//! Binary that emits command-line options markdown to stdout.
//!
//! Used to regenerate the command-line options reference.

fn main() {
    print!("{}", csvscope_cli::render_options_markdown());
}
