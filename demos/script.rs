use rhai::packages::Package;
use rhai::{Engine, EvalAltResult};
use runwait::{Config, ProcessPackage};

fn main() -> Result<(), Box<EvalAltResult>> {
    let mut engine = Engine::new();

    let package = ProcessPackage::new(Config::default().allow_commands(["ls", "grep"]));
    package.register_into_engine(&mut engine);

    let contents = engine.eval::<String>(
        r#"
        let result = process::pipeline()
                        .add("ls", [])
                        .add("grep", ["Cargo.toml"])
                        .run_wait();

        if result.success {
            result.output
        } else {
            result.error
        }
        "#,
    )?;
    println!("{}", contents);

    Ok(())
}
