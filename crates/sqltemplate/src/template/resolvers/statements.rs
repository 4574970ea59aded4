//! Statement generators: batch insert, upsert and insert with returned id

use super::{ResolveContext, Resolved};
use crate::descriptor::FieldDescriptor;
use crate::dialect::{MergeSource, ReturningIdStrategy, UpsertStrategy};
use crate::error::{TemplateError, TemplateResult, TemplateWarning};
use crate::template::tokenizer::Placeholder;

impl ResolveContext<'_> {
    /// `{{batch_insert 100}}`: one VALUES group per row with row-suffixed
    /// parameters, e.g. `(@name_0, @email_0), (@name_1, @email_1)`
    pub(crate) fn batch_insert(&self, p: &Placeholder) -> TemplateResult<Resolved> {
        let size = match p.args.flag_value(&["size", "batch"]).or(p.args.first()) {
            Some(size) => size.parse::<usize>().map_err(|_| {
                TemplateError::invalid_argument(
                    p.label(),
                    format!("batch size must be a positive integer, got '{}'", size),
                )
            })?,
            None => self
                .config
                .default_batch_size
                .ok_or_else(|| TemplateError::missing_argument(p.label(), "batch size"))?,
        };
        if size == 0 {
            return Err(TemplateError::invalid_argument(
                p.label(),
                "batch size must be a positive integer, got '0'",
            ));
        }

        let (fields, warnings) = self.filtered_fields(p, false)?;
        let columns = column_names(&fields);

        let groups: Vec<String> = (0..size)
            .map(|row| {
                let params: Vec<String> = columns
                    .iter()
                    .map(|column| self.param(&format!("{}_{}", column, row)))
                    .collect();
                format!("({})", params.join(", "))
            })
            .collect();

        let sql = format!(
            "INSERT INTO {} ({}) VALUES {}",
            self.table_name(p)?,
            columns.join(", "),
            groups.join(", ")
        );

        let mut resolved = Resolved::sql(sql).with_warnings(warnings);
        let count = columns.len() * size;
        if count > self.dialect.max_parameters {
            tracing::warn!(
                "'{}' binds {} parameters; {} accepts at most {}",
                p.label(),
                count,
                self.dialect.dialect,
                self.dialect.max_parameters
            );
            resolved = resolved.with_warning(TemplateWarning::ParameterLimit {
                dialect: self.dialect.dialect,
                placeholder: p.label(),
                count,
                limit: self.dialect.max_parameters,
            });
        }

        Ok(resolved)
    }

    /// `{{upsert}}`, `{{upsert --key Email --exclude CreatedAt}}`
    ///
    /// Key columns and primary keys never appear in the update list.
    pub(crate) fn upsert(&self, p: &Placeholder) -> TemplateResult<Resolved> {
        let (fields, warnings) = self.filtered_fields(p, false)?;
        let keys = column_names(&self.key_fields(p)?);
        let columns = column_names(&fields);

        if let Some(missing) = keys.iter().find(|key| !columns.contains(*key)) {
            return Err(TemplateError::invalid_argument(
                p.label(),
                format!("conflict key '{}' is not among the inserted columns", missing),
            ));
        }

        let updates: Vec<&str> = fields
            .iter()
            .zip(&columns)
            .filter(|(field, column)| !field.is_primary_key && !keys.contains(*column))
            .map(|(_, column)| column.as_str())
            .collect();

        let table = self.table_name(p)?;
        let params: Vec<String> = columns.iter().map(|c| self.param(c)).collect();

        let sql = match self.dialect.upsert {
            UpsertStrategy::DuplicateKeyUpdate => {
                let assignments = if updates.is_empty() {
                    format!("{} = {}", keys[0], keys[0])
                } else {
                    updates
                        .iter()
                        .map(|c| format!("{} = VALUES({})", c, c))
                        .collect::<Vec<_>>()
                        .join(", ")
                };
                format!(
                    "INSERT INTO {} ({}) VALUES ({}) ON DUPLICATE KEY UPDATE {}",
                    table,
                    columns.join(", "),
                    params.join(", "),
                    assignments
                )
            }
            UpsertStrategy::OnConflictDoUpdate => {
                let action = if updates.is_empty() {
                    "DO NOTHING".to_string()
                } else {
                    let assignments: Vec<String> = updates
                        .iter()
                        .map(|c| format!("{} = EXCLUDED.{}", c, c))
                        .collect();
                    format!("DO UPDATE SET {}", assignments.join(", "))
                };
                format!(
                    "INSERT INTO {} ({}) VALUES ({}) ON CONFLICT ({}) {}",
                    table,
                    columns.join(", "),
                    params.join(", "),
                    keys.join(", "),
                    action
                )
            }
            UpsertStrategy::Merge => self.merge(p, &table, &columns, &params, &keys, &updates)?,
        };

        Ok(Resolved::sql(sql).with_warnings(warnings))
    }

    fn merge(
        &self,
        p: &Placeholder,
        table: &str,
        columns: &[String],
        params: &[String],
        keys: &[String],
        updates: &[&str],
    ) -> TemplateResult<String> {
        let selected = || -> String {
            columns
                .iter()
                .zip(params)
                .map(|(column, param)| format!("{} AS {}", param, column))
                .collect::<Vec<_>>()
                .join(", ")
        };
        let on = keys
            .iter()
            .map(|k| format!("target.{} = source.{}", k, k))
            .collect::<Vec<_>>()
            .join(" AND ");

        let (head, terminator) = match self.dialect.merge_source {
            MergeSource::SelectParameters => (
                format!(
                    "MERGE INTO {} AS target USING (SELECT {}) AS source ON {}",
                    table,
                    selected(),
                    on
                ),
                ";",
            ),
            MergeSource::SelectFromDual => (
                format!(
                    "MERGE INTO {} target USING (SELECT {} FROM DUAL) source ON ({})",
                    table,
                    selected(),
                    on
                ),
                "",
            ),
            MergeSource::ValuesRow => (
                format!(
                    "MERGE INTO {} AS target USING (VALUES ({})) AS source ({}) ON {}",
                    table,
                    params.join(", "),
                    columns.join(", "),
                    on
                ),
                "",
            ),
            MergeSource::NotApplicable => {
                return Err(TemplateError::invalid_argument(
                    p.label(),
                    format!("{} has no MERGE source form", self.dialect.dialect),
                ))
            }
        };

        let mut sql = head;
        if !updates.is_empty() {
            let assignments: Vec<String> = updates
                .iter()
                .map(|c| format!("{} = source.{}", c, c))
                .collect();
            sql.push_str(&format!(" WHEN MATCHED THEN UPDATE SET {}", assignments.join(", ")));
        }

        let sources: Vec<String> = columns.iter().map(|c| format!("source.{}", c)).collect();
        sql.push_str(&format!(
            " WHEN NOT MATCHED THEN INSERT ({}) VALUES ({}){}",
            columns.join(", "),
            sources.join(", "),
            terminator
        ));

        Ok(sql)
    }

    /// `{{insert_returning}}`: INSERT of the non-key fields that reports the
    /// generated primary key
    pub(crate) fn insert_returning(&self, p: &Placeholder) -> TemplateResult<Resolved> {
        let id = self
            .entity
            .primary_keys()
            .first()
            .map(|f| f.column_name())
            .ok_or_else(|| {
                TemplateError::missing_argument(
                    p.label(),
                    format!("primary key (entity '{}' has none)", self.entity.name),
                )
            })?;

        let (fields, warnings) = self.filtered_fields(p, true)?;
        let columns = column_names(&fields);
        let params: Vec<String> = columns.iter().map(|c| self.param(c)).collect();
        let table = self.table_name(p)?;

        let insert = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table,
            columns.join(", "),
            params.join(", ")
        );

        let sql = match self.dialect.returning_id {
            ReturningIdStrategy::Returning => format!("{} RETURNING {}", insert, id),
            ReturningIdStrategy::OutputInserted => format!(
                "INSERT INTO {} ({}) OUTPUT INSERTED.{} VALUES ({})",
                table,
                columns.join(", "),
                id,
                params.join(", ")
            ),
            ReturningIdStrategy::LastInsertId(query) => format!("{}; {}", insert, query),
            ReturningIdStrategy::ReturningInto => {
                format!("{} RETURNING {} INTO {}", insert, id, self.param(&id))
            }
            ReturningIdStrategy::FinalTable => {
                format!("SELECT {} FROM FINAL TABLE ({})", id, insert)
            }
        };

        Ok(Resolved::sql(sql).with_warnings(warnings))
    }
}

fn column_names(fields: &[&FieldDescriptor]) -> Vec<String> {
    fields.iter().map(|f| f.column_name()).collect()
}
