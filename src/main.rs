//! certmint CLI application.
//!
//! This binary provides a command-line interface for managing an offline
//! PKI: creating certificate authorities, issuing server and user
//! certificates, and regenerating the revocation database.

use clap::{Args, Parser, Subcommand};

use certmint::cert::ca::{create_ca_cert, list_ca_certs, remove_ca_cert};
use certmint::cert::describe::cert_to_json;
use certmint::cert::intermediate::create_intermediate_ca_cert;
use certmint::cert::server::{create_server_cert, list_server_certs, remove_server_cert};
use certmint::cert::user::{create_user_cert, list_user_certs, remove_user_cert};
use certmint::cert::CreateOutcome;
use certmint::config::{
    CaOptions, Config, ServerOptions, SubjectOptions, UserOptions, ValidityOptions,
    LOCALHOST_DNS_ENV,
};
use certmint::error::Result;
use certmint::storage::database::create_cert_database;
use certmint::storage::store::{LeafKind, PkiStore, CERT_FILE};

#[derive(Parser)]
#[command(name = "certmint")]
#[command(about = "certmint: offline certificate authority manager", long_about = None)]
#[command(version)]
struct Cli {
    /// Base path for the PKI store
    #[arg(long, short = 'p', global = true, default_value = "pki")]
    path: std::path::PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Certificate authority operations
    #[command(subcommand)]
    Ca(CaCommands),

    /// Server certificate operations
    #[command(subcommand)]
    Server(ServerCommands),

    /// User certificate operations
    #[command(subcommand)]
    User(UserCommands),

    /// Revocation database operations
    #[command(subcommand)]
    Db(DbCommands),

    /// List every CA with its server and user certificates as JSON
    List,
}

#[derive(Args)]
struct SubjectArgs {
    /// Common Name in the distinguished name
    #[arg(long, short = 'n')]
    common_name: Option<String>,

    /// Country
    #[arg(long, short = 'c')]
    country: Option<String>,

    /// Organization name. This option can be specified multiple times.
    #[arg(long = "org", short = 'o')]
    organizations: Vec<String>,

    /// Organizational unit name. This option can be specified multiple times.
    #[arg(long = "org-unit", short = 'u')]
    organizational_units: Vec<String>,

    /// Locality
    #[arg(long)]
    locality: Option<String>,

    /// State or province
    #[arg(long)]
    state: Option<String>,
}

impl From<SubjectArgs> for SubjectOptions {
    fn from(args: SubjectArgs) -> Self {
        Self {
            common_name: args.common_name,
            country: args.country,
            organizations: args.organizations,
            organizational_units: args.organizational_units,
            locality: args.locality,
            state: args.state,
        }
    }
}

#[derive(Args)]
struct ValidityArgs {
    /// Create an expired certificate
    #[arg(long, short = 'e', conflicts_with = "valid_to")]
    expired: bool,

    /// Valid from date in ISO 8601 format
    #[arg(long, short = 'f')]
    valid_from: Option<String>,

    /// Valid to date in ISO 8601 format
    #[arg(long, short = 't')]
    valid_to: Option<String>,
}

impl From<ValidityArgs> for ValidityOptions {
    fn from(args: ValidityArgs) -> Self {
        Self {
            expired: args.expired,
            valid_from: args.valid_from,
            valid_to: args.valid_to,
        }
    }
}

#[derive(Subcommand)]
enum CaCommands {
    /// Create a certificate authority
    Create {
        /// Name of the certificate authority
        name: String,

        #[command(flatten)]
        subject: SubjectArgs,

        #[command(flatten)]
        validity: ValidityArgs,
    },

    /// Create an intermediate certificate authority
    IntermediateCreate {
        /// Name of the new intermediate certificate authority
        name: String,

        /// Name of the existing parent certificate authority
        root_ca_name: String,

        #[command(flatten)]
        subject: SubjectArgs,

        #[command(flatten)]
        validity: ValidityArgs,
    },

    /// List certificate authorities
    List,

    /// Remove a certificate authority and all associated users and servers
    Remove {
        /// Name of the certificate authority
        name: String,
    },

    /// Print a certificate authority's certificate as JSON
    Show {
        /// Name of the certificate authority
        name: String,

        /// Restrict the output to the named properties
        #[arg(long)]
        property: Vec<String>,
    },
}

#[derive(Subcommand)]
enum ServerCommands {
    /// Create a server certificate
    Create {
        /// Name of the server certificate
        name: String,

        /// Name of the issuing certificate authority
        ca_name: String,

        #[command(flatten)]
        subject: SubjectArgs,

        #[command(flatten)]
        validity: ValidityArgs,

        /// Create a localhost server certificate with subject alternative names
        #[arg(long, short = 'l')]
        localhost: bool,

        /// Root CA name included in the certificate bundle
        #[arg(long, short = 'r')]
        root_ca_name: Option<String>,

        /// Password protecting the bundle (defaults to "changeme")
        #[arg(long, short = 'w')]
        password: Option<String>,

        /// DNS subject alternative name. This option can be specified multiple times.
        #[arg(long = "subject-alt-dns", short = 'd')]
        subject_alt_dns: Vec<String>,

        /// IP subject alternative name. This option can be specified multiple times.
        #[arg(long = "subject-alt-ip", short = 'i')]
        subject_alt_ip: Vec<String>,
    },

    /// List server certificates
    List,

    /// Remove a server certificate
    Remove {
        /// Name of the server certificate
        name: String,

        /// Name of the issuing certificate authority
        ca_name: String,
    },

    /// Print a server certificate as JSON
    Show {
        /// Name of the server certificate
        name: String,

        /// Name of the issuing certificate authority
        ca_name: String,

        /// Restrict the output to the named properties
        #[arg(long)]
        property: Vec<String>,
    },
}

#[derive(Subcommand)]
enum UserCommands {
    /// Create a user certificate
    Create {
        /// Name of the user certificate
        name: String,

        /// Name of the issuing certificate authority
        ca_name: String,

        #[command(flatten)]
        subject: SubjectArgs,

        #[command(flatten)]
        validity: ValidityArgs,

        /// Root CA name included in the certificate bundle
        #[arg(long, short = 'r')]
        root_ca_name: Option<String>,

        /// Password protecting the bundle (defaults to "changeme")
        #[arg(long, short = 'w')]
        password: Option<String>,

        /// Email (RFC 822) subject alternative name. This option can be specified multiple times.
        #[arg(long = "subject-alt-email", short = 'm')]
        subject_alt_email: Vec<String>,
    },

    /// List user certificates
    List,

    /// Remove a user certificate
    Remove {
        /// Name of the user certificate
        name: String,

        /// Name of the issuing certificate authority
        ca_name: String,
    },

    /// Print a user certificate as JSON
    Show {
        /// Name of the user certificate
        name: String,

        /// Name of the issuing certificate authority
        ca_name: String,

        /// Restrict the output to the named properties
        #[arg(long)]
        property: Vec<String>,
    },
}

#[derive(Subcommand)]
enum DbCommands {
    /// Create an OpenSSL database file from existing certificates
    Create {
        /// Name of the certificate authority
        ca_name: String,

        /// Mark certificates whose subject contains this value as revoked.
        /// This option can be specified multiple times.
        #[arg(long = "revoked-cn")]
        revoked_cn: Vec<String>,
    },
}

fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = Config::new(cli.path);
    config.localhost_dns_name = std::env::var(LOCALHOST_DNS_ENV).ok();

    match cli.command {
        Commands::Ca(cmd) => handle_ca_command(cmd, &config),
        Commands::Server(cmd) => handle_server_command(cmd, &config),
        Commands::User(cmd) => handle_user_command(cmd, &config),
        Commands::Db(cmd) => handle_db_command(cmd, &config),
        Commands::List => {
            let inventory = PkiStore::new(&config.base_path).inventory()?;
            println!("{}", serde_json::to_string_pretty(&inventory)?);
            Ok(())
        }
    }
}

fn print_outcome(outcome: &CreateOutcome) {
    println!("{}", outcome.message());
}

fn property_filter(properties: &[String]) -> Option<&[String]> {
    if properties.is_empty() {
        None
    } else {
        Some(properties)
    }
}

fn handle_ca_command(cmd: CaCommands, config: &Config) -> Result<()> {
    match cmd {
        CaCommands::Create {
            name,
            subject,
            validity,
        } => {
            let options = CaOptions {
                subject: subject.into(),
                validity: validity.into(),
            };
            let outcome = create_ca_cert(config, &name, &options)?;
            print_outcome(&outcome);
            Ok(())
        }

        CaCommands::IntermediateCreate {
            name,
            root_ca_name,
            subject,
            validity,
        } => {
            let options = CaOptions {
                subject: subject.into(),
                validity: validity.into(),
            };
            let outcome = create_intermediate_ca_cert(config, &name, &root_ca_name, &options)?;
            print_outcome(&outcome);
            Ok(())
        }

        CaCommands::List => {
            let cas = list_ca_certs(config)?;
            if cas.is_empty() {
                println!("No certificate authorities found.");
            } else {
                println!("Available Certificate Authorities:");
                for name in cas {
                    println!("\t{name}");
                }
            }
            Ok(())
        }

        CaCommands::Remove { name } => {
            println!("{}", remove_ca_cert(config, &name)?);
            Ok(())
        }

        CaCommands::Show { name, property } => {
            let path = PkiStore::new(&config.base_path).ca_cert_path(&name);
            let projection = cert_to_json(&path, property_filter(&property))?;
            println!("{}", serde_json::to_string_pretty(&projection)?);
            Ok(())
        }
    }
}

fn handle_server_command(cmd: ServerCommands, config: &Config) -> Result<()> {
    match cmd {
        ServerCommands::Create {
            name,
            ca_name,
            subject,
            validity,
            localhost,
            root_ca_name,
            password,
            subject_alt_dns,
            subject_alt_ip,
        } => {
            let options = ServerOptions {
                subject: subject.into(),
                validity: validity.into(),
                localhost,
                root_ca_name,
                password,
                subject_alt_dns_names: subject_alt_dns,
                subject_alt_ip_names: subject_alt_ip,
            };
            let outcome = create_server_cert(config, &name, &ca_name, &options)?;
            print_outcome(&outcome);
            Ok(())
        }

        ServerCommands::List => {
            for (ca_name, servers) in list_server_certs(config)? {
                println!("Server certificates for {ca_name}:");
                for name in servers {
                    println!("\t{name}");
                }
            }
            Ok(())
        }

        ServerCommands::Remove { name, ca_name } => {
            println!("{}", remove_server_cert(config, &name, &ca_name)?);
            Ok(())
        }

        ServerCommands::Show {
            name,
            ca_name,
            property,
        } => {
            let path = PkiStore::new(&config.base_path)
                .leaf_dir(LeafKind::Server, &ca_name, &name, false)
                .join(CERT_FILE);
            let projection = cert_to_json(&path, property_filter(&property))?;
            println!("{}", serde_json::to_string_pretty(&projection)?);
            Ok(())
        }
    }
}

fn handle_user_command(cmd: UserCommands, config: &Config) -> Result<()> {
    match cmd {
        UserCommands::Create {
            name,
            ca_name,
            subject,
            validity,
            root_ca_name,
            password,
            subject_alt_email,
        } => {
            let options = UserOptions {
                subject: subject.into(),
                validity: validity.into(),
                root_ca_name,
                password,
                subject_alt_email_names: subject_alt_email,
            };
            let outcome = create_user_cert(config, &name, &ca_name, &options)?;
            print_outcome(&outcome);
            Ok(())
        }

        UserCommands::List => {
            for (ca_name, users) in list_user_certs(config)? {
                println!("User certificates for {ca_name}:");
                for name in users {
                    println!("\t{name}");
                }
            }
            Ok(())
        }

        UserCommands::Remove { name, ca_name } => {
            println!("{}", remove_user_cert(config, &name, &ca_name)?);
            Ok(())
        }

        UserCommands::Show {
            name,
            ca_name,
            property,
        } => {
            let path = PkiStore::new(&config.base_path)
                .leaf_dir(LeafKind::User, &ca_name, &name, false)
                .join(CERT_FILE);
            let projection = cert_to_json(&path, property_filter(&property))?;
            println!("{}", serde_json::to_string_pretty(&projection)?);
            Ok(())
        }
    }
}

fn handle_db_command(cmd: DbCommands, config: &Config) -> Result<()> {
    match cmd {
        DbCommands::Create {
            ca_name,
            revoked_cn,
        } => {
            create_cert_database(config, &ca_name, &revoked_cn)?;
            println!("Certificate database for {ca_name} was created.");
            Ok(())
        }
    }
}
