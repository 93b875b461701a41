use paintshop::*;
use std::path::PathBuf;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
struct Opt {
    // Input file: first line is the number of cases; each case lists its
    // color count, its customer count, and one preference line per customer.
    #[structopt(parse(from_os_str))]
    input: PathBuf,
}

fn main() {
    let opt = Opt::from_args();
    match Batch::from_path(&opt.input) {
        Ok(batch) => {
            for line in batch.report() {
                println!("{}", line);
            }
        }
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }
}
