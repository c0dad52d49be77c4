#[macro_use] extern crate clap;
#[macro_use] extern crate log;

use permcat::*;
use clap::{Arg, App, AppSettings, SubCommand, ArgMatches};
use std::path::Path;
use std::process;

fn print_error_debug(e: &Error) {
    use std::env;
    // print causes of error if present
    if let Ok(_) = env::var("CI") {
        // only print debug implementation rather than unwinding
        warn!("{:?}", e);
    } else {
        // normal case - unwind the error chain
        for e in e.iter().skip(1) {
            warn!("caused by: {}", e);
        }
    }
}

fn main() {
    let app = App::new("permcat")
        .version(crate_version!())
        .setting(AppSettings::VersionlessSubcommands)
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .setting(AppSettings::ColoredHelp)
        .setting(AppSettings::DeriveDisplayOrder)
        .global_settings(&[AppSettings::ColoredHelp])
        .about("Enumerate where a user may act on each resource")
        .arg(Arg::with_name("verbose")
            .short("v")
            .multiple(true)
            .global(true)
            .help("Increase verbosity"))
        .arg(Arg::with_name("debug")
            .short("d")
            .long("debug")
            .global(true)
            .help("Adds line numbers to log statements"))
        .arg(Arg::with_name("config")
            .short("c")
            .long("config")
            .takes_value(true)
            .global(true)
            .help("Directory containing permcat.yml"))

        .subcommand(SubCommand::with_name("calculate")
            .about("Calculate the permissions of a user")
            .arg(Arg::with_name("user")
                .short("u")
                .long("user")
                .required(true)
                .takes_value(true)
                .help("User to evaluate"))
            .arg(Arg::with_name("group")
                .short("g")
                .long("group")
                .takes_value(true)
                .multiple(true)
                .number_of_values(1)
                .help("Group the user belongs to"))
            .arg(Arg::with_name("resources")
                .required(true)
                .multiple(true)
                .help("Resource types and verbs as resource[.group]:verb,verb")))

        .subcommand(SubCommand::with_name("review")
            .about("Complete an AuthorizationReview")
            .arg(Arg::with_name("file")
                .required(true)
                .help("Review in yaml or json"))
            .arg(Arg::with_name("user")
                .short("u")
                .long("user")
                .takes_value(true)
                .help("Requesting user, used when the review names no user"))
            .arg(Arg::with_name("group")
                .short("g")
                .long("group")
                .takes_value(true)
                .multiple(true)
                .number_of_values(1)
                .help("Group of the requesting user")))

        .subcommand(SubCommand::with_name("resources")
            .about("List the registered resource types and their scoping"))

        .subcommand(SubCommand::with_name("config")
            .about("Show or verify the config")
            .subcommand(SubCommand::with_name("verify")
                .about("Verify the config and its cluster state file"))
            .subcommand(SubCommand::with_name("show")
                .about("Show the resolved config")));

    // arg parse
    let args = app.get_matches();
    let name = args.subcommand_name().unwrap_or("permcat");
    let _ = run(&args).map_err(|e| {
        error!("{} error: {}", name, e);
        print_error_debug(&e);
        process::exit(1);
    });
    process::exit(0);
}

fn run(args: &ArgMatches) -> Result<()> {
    // initialise deps and set log default - always show INFO messages (+1)
    loggerv::Logger::new()
        .verbosity(args.occurrences_of("verbose") + 1)
        .module_path(true)
        .line_numbers(args.is_present("debug"))
        .init()
        .map_err(|e| Error::from(format!("failed to initialise logger: {}", e)))?;

    // Ignore SIGPIPE errors to avoid having to use let _ = write! everywhere
    // See https://github.com/rust-lang/rust/issues/46016
    unsafe {
        libc::signal(libc::SIGPIPE, libc::SIG_DFL);
    }

    dispatch_commands(args)
}

fn read_config(args: &ArgMatches) -> Result<Config> {
    match args.value_of("config") {
        Some(dir) => Config::read_from(Path::new(dir)),
        None => Config::read(),
    }
}

fn user_from(args: &ArgMatches) -> Option<UserInfo> {
    let name = args.value_of("user")?;
    let groups = args.values_of("group").map(|gs| gs.collect::<Vec<_>>()).unwrap_or_default();
    Some(UserInfo::new(name, &groups))
}

/// Dispatch clap arguments to permcat handlers
fn dispatch_commands(args: &ArgMatches) -> Result<()> {
    if let Some(a) = args.subcommand_matches("calculate") {
        let conf = read_config(a)?;
        let user = match user_from(a) {
            Some(u) => u,
            None => return Err("calculate needs a --user".into()),
        };
        let mut rvs = vec![];
        for r in a.values_of("resources").into_iter().flatten() {
            rvs.push(permcat::show::parse_resource_verbs(r)?);
        }
        return permcat::show::permissions(&conf, &user, &rvs);
    }
    else if let Some(a) = args.subcommand_matches("review") {
        let conf = read_config(a)?;
        let requester = user_from(a);
        let file = a.value_of("file").unwrap_or_default();
        return permcat::show::review(&conf, Path::new(file), requester.as_ref());
    }
    else if let Some(a) = args.subcommand_matches("resources") {
        let conf = read_config(a)?;
        return permcat::show::resources(&conf);
    }
    else if let Some(a) = args.subcommand_matches("config") {
        let conf = read_config(a)?;
        if a.subcommand_matches("verify").is_some() {
            conf.verify()?;
            info!("Config in {} verified", conf.dir.display());
            return Ok(());
        }
        return permcat::show::config(&conf);
    }
    unreachable!("Subcommand valid, but not implemented")
}
