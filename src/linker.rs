use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;
use tracing::{debug, info};

use crate::api::{Data, DataFilter, ResolweClient};
use crate::domain::{self, DataId, DataType, GenomeName, LinkRule, Resource};
use crate::error::ReslinkError;
use crate::ssh::{RemoteConnector, RemoteSession, RemoteShell};
use crate::store::LinkTree;
use crate::table::{DEFAULT_TABLE_NAME, DataTable, TableRow};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkMode {
    Local,
    Remote,
}

#[derive(Debug, Clone, Serialize)]
pub struct LinkEntry {
    pub source: String,
    pub dest: String,
    pub mode: LinkMode,
}

#[derive(Debug, Clone, Serialize)]
pub struct LinkReport {
    pub links: Vec<LinkEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectReport {
    pub links: Vec<LinkEntry>,
    pub table_path: String,
    pub table_rows: usize,
}

pub struct Linker<C, R> {
    api: C,
    connector: R,
    tree: LinkTree,
}

impl<C: ResolweClient, R: RemoteConnector> Linker<C, R> {
    pub fn new(api: C, connector: R, tree: LinkTree) -> Self {
        Self {
            api,
            connector,
            tree,
        }
    }

    /// Links every matching file of the given resources under `dest`, one
    /// subfolder per rule.
    pub fn create_links(
        &self,
        resources: &[Resource],
        genome: &GenomeName,
        rules: &[LinkRule],
        dest: &Utf8Path,
    ) -> Result<LinkReport, ReslinkError> {
        let mut session = RemoteSession::new(&self.connector);
        let mut links = Vec::new();

        info!("linking results");
        for rule in rules {
            let filter = DataFilter::ok_of_type(&rule.data_type);
            for resource in resources {
                for data in self.api.resource_data(resource, &filter)? {
                    for file_name in data.files(rule.field.filter_name()) {
                        let link_name = domain::link_file_name(
                            data.id,
                            data.slug_for_link(),
                            &rule.field,
                            genome,
                            &file_name,
                        );
                        links.push(self.link_one(
                            &mut session,
                            data.id,
                            &file_name,
                            &rule.subfolder,
                            &link_name,
                            dest,
                        )?);
                    }
                }
            }
        }

        session.close()?;
        Ok(LinkReport { links })
    }

    /// Fixed rule set, raw-file-name link names, and a tab-separated
    /// metadata table with one row per linked BAM file.
    pub fn link_project(
        &self,
        resource: &Resource,
        genome: &GenomeName,
        dest: &Utf8Path,
        output_table: Option<&Utf8Path>,
    ) -> Result<ProjectReport, ReslinkError> {
        let rules = domain::project_rules();
        let mut session = RemoteSession::new(&self.connector);
        let mut links = Vec::new();
        let mut table = DataTable::new();

        info!("linking results");
        for rule in &rules {
            let filter = DataFilter::ok_of_type(&rule.data_type);
            for data in self.api.resource_data(resource, &filter)? {
                for file_name in data.files(rule.field.filter_name()) {
                    if rule.field.is_named("bam") {
                        table.push(self.table_row(&data, genome, dest)?);
                    }

                    let link_name = domain::project_link_file_name(data.id, &file_name);
                    links.push(self.link_one(
                        &mut session,
                        data.id,
                        &file_name,
                        &rule.subfolder,
                        &link_name,
                        dest,
                    )?);
                }
            }
        }

        let table_path = match output_table {
            Some(path) => path.to_path_buf(),
            None => Utf8PathBuf::from(DEFAULT_TABLE_NAME),
        };
        table.write_to(&table_path)?;

        session.close()?;
        Ok(ProjectReport {
            links,
            table_path: table_path.to_string(),
            table_rows: table.len(),
        })
    }

    fn link_one(
        &self,
        session: &mut RemoteSession<'_, R>,
        id: DataId,
        file_name: &str,
        subfolder: &str,
        link_name: &str,
        dest: &Utf8Path,
    ) -> Result<LinkEntry, ReslinkError> {
        let source = self.tree.source_path(id, file_name);
        let link_path = dest.join(subfolder).join(link_name);

        if self.tree.is_local(&source) {
            LinkTree::create_local_link(&source, &link_path)?;
            debug!(source = %source, dest = %link_path, "created local link");
            Ok(LinkEntry {
                source: source.to_string(),
                dest: link_path.to_string(),
                mode: LinkMode::Local,
            })
        } else {
            let shell = session.shell()?;
            if let Some(dir) = link_path.parent() {
                shell.run(&format!("mkdir -p \"{dir}\""))?;
            }
            shell.run(&format!("ln -sf \"{source}\" \"{link_path}\""))?;
            debug!(source = %source, dest = %link_path, "created remote link");
            Ok(LinkEntry {
                source: source.to_string(),
                dest: link_path.to_string(),
                mode: LinkMode::Remote,
            })
        }
    }

    fn table_row(
        &self,
        data: &Data,
        genome: &GenomeName,
        dest: &Utf8Path,
    ) -> Result<TableRow, ReslinkError> {
        let name = match &data.sample {
            Some(sample) => sample.name.to_uppercase(),
            None => data.slug.to_uppercase(),
        };

        let background = match &data.sample {
            Some(sample) => match self.api.sample_background(sample) {
                Ok(Some(background)) => background.slug.to_uppercase(),
                Ok(None) => "NONE".to_string(),
                Err(err) => {
                    debug!(sample = %sample.slug, error = %err, "background lookup failed");
                    "NONE".to_string()
                }
            },
            None => "NONE".to_string(),
        };

        let enriched_macs = match &data.sample {
            Some(sample) => {
                let macs_type: DataType = "data:chipseq:macs14".parse()?;
                let macs = self
                    .api
                    .sample_data(sample, &DataFilter::of_type(&macs_type))?;
                match macs.first().and_then(|peak_call| peak_call.peaks_bed_file()) {
                    Some(file) => format!("{}_{}", data.id.padded(), file),
                    None => "NONE".to_string(),
                }
            }
            None => "NONE".to_string(),
        };

        Ok(TableRow {
            file_path: format!("{}/", dest.join("bams")),
            unique_id: data.id.to_string(),
            genome: genome.as_str().to_string(),
            name,
            background,
            enriched_region: "NONE".to_string(),
            enriched_macs,
            color: "0,0,0".to_string(),
            raw: String::new(),
        })
    }
}
